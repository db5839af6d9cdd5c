/// Configuration options for type resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Optional members and parameters gain `| undefined`
    pub strict_null_checks: bool,

    /// Read type annotations in untyped sources (`.js`, `<script>` without `lang="ts"`)
    /// instead of lowering them to `any`
    pub force_typed: bool,

    /// Nesting limit for generic instantiations before degrading to `unknown`
    pub max_instantiation_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strict_null_checks: true,
            force_typed: false,
            max_instantiation_depth: 50,
        }
    }
}

impl CompilerOptions {
    /// Strict null checks and typed analysis of every source
    pub fn strict() -> Self {
        Self {
            force_typed: true,
            ..Default::default()
        }
    }

    /// Optional members keep their declared type as written
    pub fn loose() -> Self {
        Self {
            strict_null_checks: false,
            ..Default::default()
        }
    }
}
