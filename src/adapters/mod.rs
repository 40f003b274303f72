//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                  |
//! |----------------|--------------|------------------------------|
//! | `clock`        | Clock        | Host wall clock / manual     |
//! | `file_store`   | StoragePort  | One JSON file per key        |
//! | `log_sink`     | EventSink    | `log` facade                 |
//! | `memory_store` | StoragePort  | Shared in-memory map         |

pub mod clock;
pub mod file_store;
pub mod log_sink;
pub mod memory_store;
