#![warn(missing_docs)]

//!
//! A crate that builds and trains sequential neural networks
//! from YAML configuration documents.
//!
//! The crate has two halves that share one document format.
//!
//! - Configuration editing
//!     [`ConfigEditor`](editor::ConfigEditor) collects the data source,
//!     the layer stack, the training hyperparameters, and the seed,
//!     and writes them as YAML with the keys
//!     `data`, `model`, `layers`, `training`, `random_seed`, in this order.
//!     The `configure` binary drives it interactively.
//!
//!
//! - Building and training
//!     [`ModelSmith`] reads a document, seeds the random generator,
//!     loads the CSV data, constructs a [`Sequential`] model layer by layer,
//!     and trains it.
//!     The `modelsmith` binary runs this loop interactively
//!     and saves trained models as JSON.
//!
//! # Example
//! ```no_run
//! use modelsmith::prelude::*;
//!
//! let mut smith = ModelSmith::open("model.yaml")?;
//! let data = smith.get_data()?;
//! let mut model = smith.create_model()?;
//! smith.train_model(&mut model, &data)?;
//! println!("{}", model.summary());
//! model.save("model.json")?;
//! # Ok::<(), modelsmith::error::Error>(())
//! ```

pub mod error;
pub mod config;
pub mod data;
pub mod network;
pub mod trainer;
pub mod editor;
pub mod console;
pub mod logging;

/// Exports the types used in most programs.
pub mod prelude;


pub use config::{ModelConfig, LayerSpec, ParamValue};
pub use data::{Dataset, DataReader};
pub use network::{Sequential, LayerRegistry, History};
pub use trainer::ModelSmith;
pub use editor::{ConfigEditor, EditorSession};
