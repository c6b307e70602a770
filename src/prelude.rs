pub use crate::config::{
    ModelConfig,
    DataSection,
    TrainingSection,
    LayerSpec,
    ParamValue,
};


pub use crate::data::{
    Dataset,
    DataReader,
    load_dataset,
};


pub use crate::network::{
    // Model
    Sequential,
    FitOptions,
    Evaluation,
    History,


    // Layers
    Layer,
    LayerRegistry,
    InputLayer,
    Dense,
    Dropout,
    ActivationLayer,
    Flatten,
    Activation,
    Initializer,


    // Training
    Optimizer,
    OptimizerKind,
    Loss,
    Metric,
};


pub use crate::trainer::ModelSmith;


pub use crate::editor::{
    ConfigEditor,
    DataForm,
    TrainingForm,
};
