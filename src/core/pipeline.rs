//! The expansion pipeline: wildcard resolution → parse → evaluation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use thiserror::Error;

use crate::core::evaluator::{self, ConfigurationError};
use crate::core::parser::{self, SyntaxError};
use crate::core::wildcard;
use crate::schema::table::{TableError, WildcardTable};

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
}

/// Expand a template once: resolve wildcards against `table`, parse the
/// resolved text, and evaluate the resulting tree.
///
/// The one `rng` is threaded through both random stages, so a caller that
/// fixes the seed gets fully reproducible output. Any error aborts the call
/// with no partial output; retries are a caller-level concern.
pub fn expand(
    template: &str,
    table: &WildcardTable,
    rng: &mut StdRng,
) -> Result<String, ExpandError> {
    let resolved = wildcard::resolve(template, table, rng);
    let tree = parser::parse(&resolved)?;
    Ok(evaluator::evaluate(&tree, rng)?)
}

/// A reusable expansion front-end owning a wildcard table and a seed policy.
/// Built via `PromptEngine::builder()`.
pub struct PromptEngine {
    table: WildcardTable,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing a `PromptEngine`.
pub struct PromptEngineBuilder {
    wildcards_dir: Option<String>,
    wildcards_ron: Option<String>,
    table: Option<WildcardTable>,
    seed: u64,
}

impl PromptEngine {
    pub fn builder() -> PromptEngineBuilder {
        PromptEngineBuilder {
            wildcards_dir: None,
            wildcards_ron: None,
            table: None,
            seed: 0,
        }
    }

    /// Expand `template` once with a per-call RNG derived from the engine
    /// seed and generation counter, then advance the counter.
    pub fn expand(&mut self, template: &str) -> Result<String, ExpandError> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.generation_count));
        let result = expand(template, &self.table, &mut rng)?;
        self.generation_count += 1;
        Ok(result)
    }

    /// Expand `template` several times, one counter advance per draw.
    pub fn expand_variants(
        &mut self,
        template: &str,
        count: usize,
    ) -> Result<Vec<String>, ExpandError> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.expand(template)?);
        }
        Ok(results)
    }

    pub fn table(&self) -> &WildcardTable {
        &self.table
    }
}

impl PromptEngineBuilder {
    /// Load wildcards from a directory of `*.txt` files.
    pub fn wildcards_dir(mut self, path: &str) -> Self {
        self.wildcards_dir = Some(path.to_string());
        self
    }

    /// Load wildcards from a compiled RON table.
    pub fn wildcards_ron(mut self, path: &str) -> Self {
        self.wildcards_ron = Some(path.to_string());
        self
    }

    /// Provide a table directly (for testing without files).
    pub fn with_table(mut self, table: WildcardTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the engine, loading any configured table sources. Later
    /// sources override earlier ones on name collisions: direct table,
    /// then RON file, then directory.
    pub fn build(self) -> Result<PromptEngine, ExpandError> {
        let mut table = self.table.unwrap_or_default();
        if let Some(ref path) = self.wildcards_ron {
            table.merge(WildcardTable::load_from_ron(Path::new(path))?);
        }
        if let Some(ref dir) = self.wildcards_dir {
            table.merge(WildcardTable::load_from_dir(Path::new(dir))?);
        }
        Ok(PromptEngine {
            table,
            seed: self.seed,
            generation_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> WildcardTable {
        let mut table = WildcardTable::new();
        table.insert("color", vec!["red".to_string(), "blue".to_string()]);
        table.insert(
            "cloth/dress-style",
            vec!["gown".to_string(), "sundress".to_string()],
        );
        table.insert(
            "outfit",
            vec!["__color__ __cloth/dress-style__".to_string()],
        );
        table
    }

    #[test]
    fn expand_runs_all_three_stages() {
        let table = test_table();
        let mut rng = StdRng::seed_from_u64(42);
        let result = expand("__color__ hair, {long|short} cut", &table, &mut rng).unwrap();

        let (hair, cut) = result.split_once(" hair, ").unwrap();
        assert!(hair == "red" || hair == "blue", "got: {}", result);
        assert!(cut == "long cut" || cut == "short cut", "got: {}", result);
    }

    #[test]
    fn expand_resolves_nested_wildcards() {
        let table = test_table();
        let mut rng = StdRng::seed_from_u64(42);
        let result = expand("__outfit__", &table, &mut rng).unwrap();
        assert!(!result.contains("__"), "unresolved token in: {}", result);
        let (color, style) = result.split_once(' ').unwrap();
        assert!(color == "red" || color == "blue", "got: {}", result);
        assert!(style == "gown" || style == "sundress", "got: {}", result);
    }

    #[test]
    fn expand_is_reproducible_under_fixed_seed() {
        let table = test_table();
        let template = "__color__ hair, {1-2$$long|short|wavy}";
        let first = expand(template, &table, &mut StdRng::seed_from_u64(9)).unwrap();
        let second = expand(template, &table, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn expand_surfaces_syntax_errors() {
        let table = WildcardTable::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            expand("{a|b", &table, &mut rng),
            Err(ExpandError::Syntax(_))
        ));
    }

    #[test]
    fn engine_same_seed_same_sequence() {
        let template = "__color__, {a|b|c}, {1-2$$x|y|z}";

        let mut first = PromptEngine::builder()
            .seed(42)
            .with_table(test_table())
            .build()
            .unwrap();
        let mut second = PromptEngine::builder()
            .seed(42)
            .with_table(test_table())
            .build()
            .unwrap();

        for _ in 0..5 {
            assert_eq!(
                first.expand(template).unwrap(),
                second.expand(template).unwrap()
            );
        }
    }

    #[test]
    fn engine_counter_varies_successive_calls() {
        let mut engine = PromptEngine::builder()
            .seed(42)
            .with_table(test_table())
            .build()
            .unwrap();

        // Ten draws over a wide space should not all collapse to one value.
        let template = "{a|b|c|d|e|f|g|h}{a|b|c|d|e|f|g|h}";
        let draws: Vec<String> = (0..10).map(|_| engine.expand(template).unwrap()).collect();
        assert!(
            draws.iter().any(|d| d != &draws[0]),
            "all draws identical: {:?}",
            draws
        );
    }

    #[test]
    fn engine_failed_call_keeps_counter() {
        let mut engine = PromptEngine::builder()
            .seed(7)
            .with_table(test_table())
            .build()
            .unwrap();

        let first = engine.expand("{a|b}").unwrap();
        assert!(engine.expand("{oops").is_err());
        let after_failure = engine.expand("{a|b|c|d}").unwrap();

        // Replaying the same successful calls without the failure in
        // between yields the same sequence.
        let mut replay = PromptEngine::builder()
            .seed(7)
            .with_table(test_table())
            .build()
            .unwrap();
        assert_eq!(replay.expand("{a|b}").unwrap(), first);
        assert_eq!(replay.expand("{a|b|c|d}").unwrap(), after_failure);
    }

    #[test]
    fn expand_variants_returns_count_results() {
        let mut engine = PromptEngine::builder()
            .seed(1)
            .with_table(test_table())
            .build()
            .unwrap();
        let variants = engine.expand_variants("{a|b|c} __color__", 4).unwrap();
        assert_eq!(variants.len(), 4);
        for v in &variants {
            assert!(!v.is_empty());
        }
    }

    #[test]
    fn builder_table_sources_merge() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scene.txt"), "beach\n").unwrap();

        let mut direct = WildcardTable::new();
        direct.insert("color", vec!["red".to_string()]);

        let engine = PromptEngine::builder()
            .with_table(direct)
            .wildcards_dir(dir.path().to_str().unwrap())
            .build()
            .unwrap();

        assert!(engine.table().get("color").is_some());
        assert!(engine.table().get("scene").is_some());
    }

    #[test]
    fn builder_missing_dir_is_an_error() {
        let result = PromptEngine::builder()
            .wildcards_dir("no/such/dir")
            .build();
        assert!(matches!(result, Err(ExpandError::Table(_))));
    }
}
