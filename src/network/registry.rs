//! The closed mapping from layer type names to layer constructors.
use indexmap::IndexMap;

use crate::config::{LayerSpec, ParamValue};
use crate::error::ConfigError;
use super::activation::Activation;
use super::initializer::Initializer;
use super::layer::*;


type Constructor = fn(&mut Params<'_>) -> Result<Layer, ConfigError>;


/// Registered layer types, in the order they are listed to users.
const REGISTRY: [(&str, Constructor); 5] = [
    ("Input", input),
    ("Dense", dense),
    ("Dropout", dropout),
    ("Activation", activation),
    ("Flatten", flatten),
];


/// Resolves layer type names to [`Layer`] constructors.
pub struct LayerRegistry;


impl LayerRegistry {
    /// Names of all registered layer types.
    pub fn names() -> Vec<&'static str> {
        REGISTRY.iter().map(|(name, _)| *name).collect()
    }


    /// Returns `true` if `kind` is a registered layer type.
    pub fn contains(kind: &str) -> bool {
        REGISTRY.iter().any(|(name, _)| *name == kind)
    }


    /// Construct the layer described by `spec`.
    /// Every key other than `type` is a constructor parameter.
    pub fn construct(spec: &LayerSpec) -> Result<Layer, ConfigError> {
        let (_, constructor) = REGISTRY.iter()
            .find(|(name, _)| *name == spec.kind)
            .ok_or_else(|| ConfigError::UnknownLayer(spec.kind.clone()))?;

        let mut params = Params::new(&spec.kind, &spec.params);
        let layer = constructor(&mut params)?;
        params.finish()?;
        Ok(layer)
    }
}


fn input(p: &mut Params<'_>) -> Result<Layer, ConfigError> {
    let name = p.string("name")?;
    let shape = p.required("shape", |v| {
            // A bare integer is a 1-D shape.
            if let Some(n) = v.as_int() {
                return positive(n).map(|n| vec![n]);
            }
            v.as_list()?
                .iter()
                .map(|item| item.as_int().and_then(positive))
                .collect::<Option<Vec<_>>>()
                .filter(|shape| !shape.is_empty())
        }, "a list of positive integers")?;
    // Only the shape matters for an Input layer.
    p.skip_rest();
    Ok(Layer::Input(InputLayer { name, shape }))
}


fn dense(p: &mut Params<'_>) -> Result<Layer, ConfigError> {
    let mut layer = Dense::new(
        p.required("units", |v| v.as_int().and_then(positive), "a positive integer")?,
        p.activation()?.unwrap_or(Activation::Linear),
    );
    layer.name = p.string("name")?;
    if let Some(flag) = p.optional("use_bias", ParamValue::as_bool, "a boolean")? {
        layer.use_bias = flag;
    }
    if let Some(init) = p.initializer("kernel_initializer")? {
        layer.kernel_initializer = init;
    }
    if let Some(init) = p.initializer("bias_initializer")? {
        layer.bias_initializer = init;
    }
    Ok(Layer::Dense(layer))
}


fn dropout(p: &mut Params<'_>) -> Result<Layer, ConfigError> {
    let rate = p.required("rate", |v| {
            v.as_float()
                .filter(|r| (0.0..1.0).contains(r))
                .map(|r| r as f32)
        }, "a number in [0, 1)")?;
    let name = p.string("name")?;
    Ok(Layer::Dropout(Dropout { name, rate }))
}


fn activation(p: &mut Params<'_>) -> Result<Layer, ConfigError> {
    let activation = p.activation()?
        .ok_or_else(|| p.invalid("activation", "is required"))?;
    let name = p.string("name")?;
    Ok(Layer::Activation(ActivationLayer { name, activation }))
}


fn flatten(p: &mut Params<'_>) -> Result<Layer, ConfigError> {
    let name = p.string("name")?;
    Ok(Layer::Flatten(Flatten { name }))
}


fn positive(n: i64) -> Option<usize> {
    usize::try_from(n).ok().filter(|&n| n > 0)
}


/// Keyword parameters of one layer.
/// Each accessor consumes a key; `finish` rejects the ones left over.
struct Params<'a> {
    layer: &'a str,
    remaining: IndexMap<&'a str, &'a ParamValue>,
}


impl<'a> Params<'a> {
    fn new(layer: &'a str, params: &'a IndexMap<String, ParamValue>) -> Self {
        let remaining = params.iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        Self { layer, remaining }
    }


    fn invalid(&self, param: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidLayerParameter {
            layer: self.layer.to_string(),
            param: param.to_string(),
            reason: reason.to_string(),
        }
    }


    fn optional<T, F>(&mut self, key: &str, convert: F, expected: &str)
        -> Result<Option<T>, ConfigError>
        where F: FnOnce(&ParamValue) -> Option<T>,
    {
        match self.remaining.shift_remove(key) {
            None | Some(ParamValue::Null) => Ok(None),
            Some(value) => convert(value)
                .map(Some)
                .ok_or_else(|| {
                    self.invalid(key, &format!("expected {expected}, got {value}"))
                }),
        }
    }


    fn required<T, F>(&mut self, key: &str, convert: F, expected: &str)
        -> Result<T, ConfigError>
        where F: FnOnce(&ParamValue) -> Option<T>,
    {
        self.optional(key, convert, expected)?
            .ok_or_else(|| self.invalid(key, "is required"))
    }


    fn string(&mut self, key: &str) -> Result<Option<String>, ConfigError> {
        self.optional(key, |v| v.as_str().map(str::to_string), "a string")
    }


    fn activation(&mut self) -> Result<Option<Activation>, ConfigError> {
        let expected = format!("one of {:?}", Activation::NAMES);
        self.optional(
            "activation",
            |v| v.as_str().and_then(Activation::from_name),
            &expected,
        )
    }


    fn initializer(&mut self, key: &str)
        -> Result<Option<Initializer>, ConfigError>
    {
        self.optional(
            key,
            |v| v.as_str().and_then(Initializer::from_name),
            "an initializer name",
        )
    }


    /// Drop every key not consumed yet.
    fn skip_rest(&mut self) {
        for key in self.remaining.keys() {
            tracing::debug!("{} layer ignores parameter `{key}`", self.layer);
        }
        self.remaining.clear();
    }


    fn finish(self) -> Result<(), ConfigError> {
        match self.remaining.keys().next() {
            Some(key) => Err(self.invalid(key, "unexpected parameter")),
            None => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_layer() {
        let err = LayerRegistry::construct(&LayerSpec::new("Conv9D"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLayer(name) if name == "Conv9D"));
    }


    #[test]
    fn type_names_are_case_sensitive() {
        assert!(LayerRegistry::contains("Dense"));
        assert!(!LayerRegistry::contains("dense"));
    }


    #[test]
    fn dense_parameters() {
        let spec = LayerSpec::new("Dense")
            .param("units", 8_i64)
            .param("activation", "relu")
            .param("use_bias", false)
            .param("name", "hidden");
        let Layer::Dense(dense) = LayerRegistry::construct(&spec).unwrap()
            else { panic!("expected a dense layer") };
        assert_eq!(dense.units, 8);
        assert_eq!(dense.activation, Activation::Relu);
        assert!(!dense.use_bias);
        assert_eq!(dense.name.as_deref(), Some("hidden"));
    }


    #[test]
    fn integral_float_units() {
        let spec = LayerSpec::new("Dense").param("units", 4.0);
        assert!(LayerRegistry::construct(&spec).is_ok());
    }


    #[test]
    fn bad_parameters() {
        let missing = LayerSpec::new("Dense");
        let wrong = LayerSpec::new("Dense").param("units", "eight");
        let extra = LayerSpec::new("Dense").param("units", 2_i64).param("foo", 1_i64);
        let rate = LayerSpec::new("Dropout").param("rate", 1.5);
        for spec in [missing, wrong, extra, rate] {
            let err = LayerRegistry::construct(&spec).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidLayerParameter { .. }),
                "{spec:?}"
            );
        }
    }


    #[test]
    fn input_shape() {
        let spec = LayerSpec::new("Input").param("shape", vec![4_i64]);
        let layer = LayerRegistry::construct(&spec).unwrap();
        assert!(layer.is_input());
        assert_eq!(layer.output_dim(0), 4);
    }


    #[test]
    fn input_ignores_other_keys() {
        let spec = LayerSpec::new("Input")
            .param("shape", vec![4_i64])
            .param("batch_size", 32_i64)
            .param("dtype", "float32");
        let Layer::Input(input) = LayerRegistry::construct(&spec).unwrap()
            else { panic!("expected an input layer") };
        assert_eq!(input.shape, vec![4]);

        // The shape itself is still checked.
        let spec = LayerSpec::new("Input").param("batch_size", 32_i64);
        assert!(matches!(
            LayerRegistry::construct(&spec),
            Err(ConfigError::InvalidLayerParameter { ref param, .. }) if param == "shape"
        ));
    }
}
