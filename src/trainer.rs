//! Builds, trains, evaluates, and saves a model described by a
//! configuration document.
use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::ModelConfig;
use crate::console::Console;
use crate::data::{self, Dataset};
use crate::error::{ConfigError, Result};
use crate::network::{
    FitOptions,
    History,
    LayerRegistry,
    Loss,
    Metric,
    Optimizer,
    Sequential,
};


/// The only supported model family, compared ignoring case.
const SEQUENTIAL: &str = "sequential";


/// Struct `ModelSmith` turns a configuration document into
/// a trained [`Sequential`] model.
///
/// The document is re-read at every stage,
/// so edits made between two retrains are picked up.
/// The random generator is seeded once, in [`ModelSmith::open`],
/// and drives weight initialization, shuffling, and dropout.
/// # Example
/// ```no_run
/// use modelsmith::ModelSmith;
///
/// let mut smith = ModelSmith::open("model.yaml")?;
/// let data = smith.get_data()?;
/// let mut model = smith.create_model()?;
/// let history = smith.train_model(&mut model, &data)?;
/// println!("final loss: {:?}", history.last().map(|r| r.loss));
/// # Ok::<(), modelsmith::error::Error>(())
/// ```
pub struct ModelSmith {
    config_path: PathBuf,
    seed: u64,
    rng: StdRng,
    verbose: bool,
}


impl ModelSmith {
    /// Read `random_seed` from the document at `path`
    /// and seed the random generator.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref().to_path_buf();
        let seed = ModelConfig::load(&config_path)?.random_seed;
        tracing::info!("seeding the random generator with {seed}");
        Ok(Self {
            config_path,
            seed,
            rng: StdRng::seed_from_u64(seed),
            verbose: true,
        })
    }


    /// If `true`, training prints one line per epoch.
    /// Default is `true`.
    pub fn verbose(mut self, flag: bool) -> Self {
        self.verbose = flag;
        self
    }


    /// The seed read by [`ModelSmith::open`].
    pub fn seed(&self) -> u64 {
        self.seed
    }


    /// Path of the configuration document.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }


    /// Read the configuration document again.
    pub fn config(&self) -> Result<ModelConfig> {
        Ok(ModelConfig::load(&self.config_path)?)
    }


    /// Load the data named in the `data` section.
    pub fn get_data(&self) -> Result<Dataset> {
        data::load_dataset(&self.config()?)
    }


    /// Construct the layers listed in the document, in order.
    ///
    /// The model name is checked before any layer is constructed.
    /// If the first layer is an `Input` layer,
    /// the weights are allocated right away.
    pub fn create_model(&mut self) -> Result<Sequential> {
        let config = self.config()?;
        if !config.model.eq_ignore_ascii_case(SEQUENTIAL) {
            return Err(ConfigError::UnsupportedModel(config.model).into());
        }

        let mut model = Sequential::new();
        for (i, spec) in config.layers.iter().enumerate() {
            let layer = LayerRegistry::construct(spec)?;
            tracing::debug!("layer {}: {}", i + 1, spec.describe());
            model.add(layer);
        }

        if let Some(input_dim) = model.declared_input_dim() {
            model.build(input_dim, &mut self.rng)?;
        }
        tracing::info!("created a sequential model with {} layers", model.len());
        Ok(model)
    }


    /// Compile `model` with the `training` section and fit it on `data`.
    pub fn train_model(&mut self, model: &mut Sequential, data: &Dataset)
        -> Result<History>
    {
        let config = self.config()?;
        let training = &config.training;
        training.validate()?;

        let optimizer = Optimizer::resolve(
            training.optimizer(), training.learning_rate() as f32
        );
        let loss = Loss::from_name(training.loss())?;
        let metrics = training.metrics()
            .iter()
            .map(|name| Metric::from_name(name))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::info!(
            "training with {optimizer}, loss {loss}, {} epochs",
            training.epochs()
        );
        model.compile(optimizer, loss, metrics);

        let options = FitOptions::default()
            .batch_size(training.batch_size())
            .epochs(training.epochs())
            .validation_split(training.validation_split())
            .verbose(self.verbose);
        let history = model.fit(data, options, &mut self.rng)?;
        Ok(history)
    }
}


/// The interactive build/train loop.
///
/// Asks for the document name, seeds, and loads the data once.
/// Then repeatedly creates, trains, and evaluates the model,
/// offering to save it after each round.
pub fn run_session<R, W>(console: &mut Console<R, W>) -> Result<()>
    where R: BufRead,
          W: Write,
{
    let Some(config_name) = console.prompt("Enter YAML model config file name:")?
    else {
        return Ok(());
    };
    let mut smith = ModelSmith::open(&config_name)?;
    let data = smith.get_data()?;

    loop {
        let mut model = smith.create_model()?;
        console.say(model.summary())?;
        smith.train_model(&mut model, &data)?;
        console.say(model.summary())?;

        let evaluation = model.evaluate(&data)?;
        let accuracy = evaluation.accuracy()
            .or_else(|| evaluation.metrics.first().map(|(_, v)| *v))
            .map_or_else(|| "n/a".to_string(), |v| v.to_string());
        console.say(format!(
            "{} {}",
            format!("Loss: {},", evaluation.loss).bold().green(),
            format!("Accuracy: {accuracy}").bold().yellow(),
        ))?;

        if console.confirm("Would you like to save the model?")? {
            let name = console.prompt("Please provide a name for the model:")?;
            if let Some(name) = name.filter(|name| !name.is_empty()) {
                let file = format!("{name}.json");
                model.save(&file)?;
                console.notice(format!("Model saved as {file}"))?;
            }
        }

        if !console.confirm("Would you like to recreate and retrain this model?")? {
            break;
        }
    }
    Ok(())
}
