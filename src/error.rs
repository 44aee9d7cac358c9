use crate::catalog::TreeKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate {what} id `{id}`")]
    DuplicateId { what: &'static str, id: String },

    #[error("tree `{kind}` must have a positive growth time")]
    ZeroGrowthTime { kind: TreeKind },

    #[error("`{field}` must be finite and non-negative (got {value})")]
    InvalidMagnitude { field: String, value: f64 },

    #[error("shop item `{item}` sells seeds for `{kind}`, which has no catalog entry")]
    UnknownSeed { item: String, kind: TreeKind },

    #[error("timing `{field}` must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("special event chance {0} is outside [0, 1]")]
    InvalidChance(f64),

    #[error("special events need at least one multiplier, all of them positive")]
    InvalidEventMultipliers,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("the game runtime has shut down")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShopError {
    #[error("no shop item `{0}`")]
    UnknownItem(String),

    #[error("`{item}` unlocks at {threshold} oxygen")]
    Locked { item: String, threshold: u64 },

    #[error("`{item}` costs {price} oxygen, only {available} available")]
    InsufficientOxygen {
        item: String,
        price: u64,
        available: u64,
    },

    #[error("seeds need a fully tilled plot")]
    NoTilledPlots,
}
