//! Content library: the geometry registry plus typed question pools per
//! module/mode, built once at startup and shared read-only by sessions.

use std::collections::HashMap;

use tracing::{error, info, instrument, warn};

use crate::config::{build_question, load_content_config_from_env, QuestionCfg};
use crate::domain::{ModuleId, Question};
use crate::error::CoreError;
use crate::geometry::GeometryRegistry;
use crate::seeds::seed_questions;

#[derive(Clone, Debug, Default)]
pub struct ContentLibrary {
    registry: GeometryRegistry,
    pools: HashMap<(ModuleId, String), Vec<Question>>,
}

impl ContentLibrary {
    /// Built-in seeds plus the optional CONTENT_PATH bank.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let extra = load_content_config_from_env()
            .map(|c| c.questions)
            .unwrap_or_default();
        Self::build(GeometryRegistry::standard(), seed_questions(), extra)
    }

    /// Seeds first; `extra` records reusing a seed id are skipped.
    /// Records that fail validation are logged and left out.
    pub fn build(registry: GeometryRegistry, seeds: Vec<QuestionCfg>, extra: Vec<QuestionCfg>) -> Self {
        let mut lib = Self {
            registry,
            pools: HashMap::new(),
        };
        for (origin, records) in [("seed", seeds), ("bank", extra)] {
            for cfg in &records {
                match build_question(cfg, &lib.registry) {
                    Ok(q) => {
                        if lib.get(&q.id).is_some() {
                            warn!(target: "content", id = %q.id, %origin, "Duplicate question id; keeping the first");
                            continue;
                        }
                        lib.insert(q);
                    }
                    Err(e) => {
                        error!(target: "content", module = %cfg.module, mode = %cfg.mode, %origin, error = %e, "Skipping invalid question");
                    }
                }
            }
        }
        lib.log_inventory();
        lib
    }

    pub fn registry(&self) -> &GeometryRegistry {
        &self.registry
    }

    /// Questions of one module/mode in load order; empty if none.
    pub fn pool(&self, module: ModuleId, mode: &str) -> &[Question] {
        self.pools
            .get(&(module, mode.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Same as `pool`, but an empty pool is an `EmptyPool` error.
    pub fn require_pool(&self, module: ModuleId, mode: &str) -> Result<&[Question], CoreError> {
        let pool = self.pool(module, mode);
        if pool.is_empty() {
            return Err(CoreError::EmptyPool {
                module: module.to_string(),
                mode: mode.to_string(),
            });
        }
        Ok(pool)
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.pools.values().flatten().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, q: Question) {
        self.pools
            .entry((q.module, q.mode.clone()))
            .or_default()
            .push(q);
    }

    fn log_inventory(&self) {
        for module in ModuleId::ALL {
            for mode in module.profile().modes {
                let count = self.pool(module, mode.key).len();
                if count == 0 {
                    warn!(target: "content", %module, mode = mode.key, "Empty question pool");
                } else {
                    info!(target: "content", %module, mode = mode.key, count, "Startup question inventory");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_fill_every_pool() {
        let lib = ContentLibrary::build(GeometryRegistry::standard(), seed_questions(), vec![]);
        for module in ModuleId::ALL {
            for mode in module.profile().modes {
                assert!(!lib.pool(module, mode.key).is_empty(), "{module}/{}", mode.key);
            }
        }
        assert!(lib.get("d8-square").is_some());
    }

    #[test]
    fn bank_cannot_overwrite_seed_ids_and_invalid_records_are_skipped() {
        let mut dup = QuestionCfg::new(ModuleId::Bonding, "spectra");
        dup.id = Some("spectra-1".into());
        dup.prompt = "replacement".into();
        dup.answer = Some("high spin".into());

        let mut bad = QuestionCfg::new(ModuleId::Bonding, "builder");
        bad.id = Some("bad".into());
        bad.prompt = "[X]".into();
        bad.geometry = Some("see-saw".into());
        bad.d_electrons = Some(3);
        bad.spin = Some("high".into());

        let lib = ContentLibrary::build(GeometryRegistry::standard(), seed_questions(), vec![dup, bad]);
        assert_ne!(lib.get("spectra-1").unwrap().prompt, "replacement");
        assert!(lib.get("bad").is_none());
    }

    #[test]
    fn unknown_pool_is_empty() {
        let lib = ContentLibrary::default();
        assert!(lib.pool(ModuleId::Bonding, "mo").is_empty());
        assert!(lib.is_empty());
        assert!(matches!(
            lib.require_pool(ModuleId::Bonding, "mo"),
            Err(CoreError::EmptyPool { .. })
        ));
    }
}
