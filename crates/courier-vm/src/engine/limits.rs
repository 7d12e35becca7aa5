/// Bounds on a single evaluation.
///
/// Folding runs caller-supplied subtrees at encode time, so these bounds apply
/// there as well as to [`crate::Predicate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuelLimits {
    pub(crate) exec_fuel: u32,
    pub(crate) recursion_limit: u32,
    pub(crate) max_array_len: u32,
}

impl Default for FuelLimits {
    fn default() -> Self {
        Self {
            exec_fuel: 100_000,
            recursion_limit: 256,
            max_array_len: 65_536,
        }
    }
}

impl FuelLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes an evaluation may visit, lambda bodies included.
    pub fn exec_fuel(mut self, nodes: u32) -> Self {
        self.exec_fuel = nodes;
        self
    }

    /// Nesting of expression nodes and lambda invocations.
    pub fn recursion_limit(mut self, depth: u32) -> Self {
        self.recursion_limit = depth;
        self
    }

    /// Largest length a `NewArrayBounds` node may allocate.
    pub fn max_array_len(mut self, len: u32) -> Self {
        self.max_array_len = len;
        self
    }

    pub fn get_exec_fuel(&self) -> u32 {
        self.exec_fuel
    }

    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    pub fn get_max_array_len(&self) -> u32 {
        self.max_array_len
    }

    /// Limits for folding, where a subtree rarely needs more than a few hundred steps.
    pub fn folding() -> Self {
        Self {
            exec_fuel: 10_000,
            recursion_limit: 128,
            max_array_len: 4_096,
        }
    }
}
