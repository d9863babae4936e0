use std::fs::{self, File};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{ArrayD, IxDyn};
use prost::Message;

use paddle_parser::{
    proto::{ConvConfig, LayerConfig, LayerInputConfig, ModelConfig, ParameterConfig, PoolConfig},
    AttrValue, ConvDispatch, Error, PaddleModelLoader, PaddleParser, ParameterStore, ParserOptions,
    WeightRole, WeightTensor,
};

fn input(layer: &str, parameter: Option<&str>) -> LayerInputConfig {
    LayerInputConfig {
        input_layer_name: layer.to_string(),
        input_parameter_name: parameter.map(str::to_string),
        ..Default::default()
    }
}

fn conv_layer(name: &str, ty: &str, from: &str, channels: u32, filters: u32, filter_size: u32, active: &str) -> LayerConfig {
    let mut conv_input = input(from, Some(&format!("_{}.w0", name)));
    conv_input.conv_conf = Some(ConvConfig {
        filter_size,
        channels,
        stride: 1,
        padding: filter_size / 2,
        groups: 1,
        filter_channels: channels,
        output_x: 8,
        img_size: 8,
        ..Default::default()
    });
    LayerConfig {
        name: name.to_string(),
        r#type: ty.to_string(),
        active_type: Some(active.to_string()),
        num_filters: Some(filters),
        inputs: vec![conv_input],
        ..Default::default()
    }
}

/// image -> conv1(relu) -> bn1 -> conv2 ; res = conv1 + conv2 -> pool1 -> fc1(softmax) -> odd
fn network(fc_activation: &str) -> ModelConfig {
    let mut pool_input = input("res", None);
    pool_input.pool_conf = Some(PoolConfig {
        pool_type: "max-projection".to_string(),
        channels: 2,
        size_x: 2,
        stride: 2,
        output_x: 4,
        img_size: 8,
        ..Default::default()
    });

    let layers = vec![
        LayerConfig {
            name: "image".to_string(),
            r#type: "data".to_string(),
            size: Some(3 * 8 * 8),
            height: Some(8),
            width: Some(8),
            ..Default::default()
        },
        conv_layer("conv1", "exconv", "image", 3, 2, 3, "relu"),
        LayerConfig {
            name: "bn1".to_string(),
            r#type: "batch_norm".to_string(),
            bias_parameter_name: Some("_bn1.wbias".to_string()),
            inputs: vec![
                input("conv1", Some("_bn1.w0")),
                input("conv1", Some("_bn1.w1")),
                input("conv1", Some("_bn1.w2")),
            ],
            ..Default::default()
        },
        conv_layer("conv2", "cudnn_conv", "bn1", 2, 2, 1, ""),
        LayerConfig {
            name: "res".to_string(),
            r#type: "addto".to_string(),
            inputs: vec![input("conv1", None), input("conv2", None)],
            ..Default::default()
        },
        LayerConfig {
            name: "pool1".to_string(),
            r#type: "pool".to_string(),
            inputs: vec![pool_input],
            ..Default::default()
        },
        LayerConfig {
            name: "fc1".to_string(),
            r#type: "fc".to_string(),
            size: Some(10),
            active_type: Some(fc_activation.to_string()),
            bias_parameter_name: Some("_fc1.wbias".to_string()),
            inputs: vec![input("pool1", Some("_fc1.w0"))],
            ..Default::default()
        },
        LayerConfig {
            name: "odd".to_string(),
            r#type: "frobnicate".to_string(),
            inputs: vec![input("fc1", None)],
            ..Default::default()
        },
    ];

    ModelConfig {
        layers,
        input_layer_names: vec!["image".to_string()],
        output_layer_names: vec!["odd".to_string()],
        ..Default::default()
    }
}

fn tensor(len: usize, value: f32) -> WeightTensor {
    WeightTensor::from(ArrayD::from_elem(IxDyn(&[len]), value))
}

fn network_parameters() -> Vec<(&'static str, WeightTensor)> {
    vec![
        ("_conv1.w0", tensor(2 * 3 * 3 * 3, 0.1)),
        ("_bn1.w0", tensor(2, 2.0)),
        ("_bn1.w1", tensor(2, 1.0)),
        ("_bn1.w2", tensor(2, 3.0)),
        ("_bn1.wbias", tensor(2, 0.5)),
        ("_conv2.w0", tensor(2 * 2, 1.0)),
        ("_fc1.w0", tensor(32 * 10, 0.01)),
        ("_fc1.wbias", tensor(10, 0.0)),
    ]
}

fn parameter_store() -> ParameterStore {
    let mut store = ParameterStore::new();
    for (name, tensor) in network_parameters() {
        store.insert(name, tensor);
    }
    store
}

fn inputs_of<'a>(model: &'a paddle_parser::ConvertedModel, name: &str) -> Vec<&'a str> {
    model
        .graph
        .get(name)
        .unwrap_or_else(|| panic!("missing IR node {}", name))
        .input
        .iter()
        .map(String::as_str)
        .collect()
}

#[test]
fn test_full_network_conversion() {
    let parser = PaddleParser::from_model_config(&network("softmax"), parameter_store()).unwrap();
    let model = parser.gen_ir().unwrap();

    assert!(model.weights_loaded);
    assert_eq!(model.graph.len(), 10);

    // Consumers of a de-fused layer bind to its activation
    assert_eq!(model.graph.get("conv1_activation").unwrap().op, "Relu");
    assert_eq!(inputs_of(&model, "conv1_activation"), vec!["conv1"]);
    assert_eq!(inputs_of(&model, "bn1"), vec!["conv1_activation"]);
    assert_eq!(inputs_of(&model, "res"), vec!["conv1_activation", "conv2"]);
    assert_eq!(inputs_of(&model, "odd"), vec!["fc1_activation"]);

    assert_eq!(model.graph.get("res").unwrap().op, "Add");
    assert_eq!(model.graph.get("fc1_activation").unwrap().op, "Softmax");
    assert_eq!(model.graph.get("odd").unwrap().op, "frobnicate");
    assert_eq!(model.graph.get("image").unwrap().op, "DataInput");

    // Every input is emitted before its consumer
    let nodes = model.graph.nodes();
    for (position, node) in nodes.iter().enumerate() {
        for input in &node.input {
            assert!(nodes[..position].iter().any(|n| &n.name == input));
        }
    }
}

#[test]
fn test_full_network_weights() {
    let parser = PaddleParser::from_model_config(&network(""), parameter_store()).unwrap();
    let model = parser.gen_ir().unwrap();

    assert_eq!(model.weights.get("conv1", WeightRole::Weights).unwrap().shape(), &[3, 3, 3, 2]);
    assert_eq!(model.weights.get("conv2", WeightRole::Weights).unwrap().shape(), &[1, 1, 2, 2]);
    assert_eq!(model.weights.roles("bn1").len(), 4);
    assert_eq!(model.weights.roles("fc1"), vec![WeightRole::Bias, WeightRole::Weights]);
    assert!(model.weights.roles("pool1").is_empty());

    let var = model.weights.get("bn1", WeightRole::Var).unwrap();
    assert!(var.to_f32().iter().all(|&v| (v - 0.99999).abs() < 1e-6));

    let conv1 = model.graph.get("conv1").unwrap();
    assert_eq!(
        conv1.get_attr("_output_shapes").and_then(AttrValue::as_shapes).unwrap()[0].dims,
        vec![-1, 2, 8, 8]
    );
    let pool1 = model.graph.get("pool1").unwrap();
    assert_eq!(pool1.get_attr("auto_pad").and_then(AttrValue::as_str), Some("SAME"));
    assert_eq!(pool1.get_attr("pooling_type").and_then(AttrValue::as_str), Some("MAX"));
}

#[test]
fn test_conversion_without_weights() {
    let parser = PaddleParser::from_model_config(&network("softmax"), ParameterStore::not_loaded()).unwrap();
    assert!(!parser.weights_loaded());

    let model = parser.gen_ir().unwrap();
    assert!(!model.weights_loaded);
    assert!(model.weights.is_empty());
    assert_eq!(model.graph.len(), 10);
}

#[test]
fn test_unsupported_activation_aborts() {
    let parser = PaddleParser::from_model_config(&network("brelu"), parameter_store()).unwrap();
    let result = parser.gen_ir();
    assert!(matches!(result, Err(Error::UnsupportedActivation(ref name)) if name == "brelu"));
}

#[test]
fn test_options_change_conversion() {
    let mut config = network("");
    config.layers[1].r#type = "exconvt".to_string();
    let parser = PaddleParser::from_model_config(&config, ParameterStore::not_loaded()).unwrap();

    assert_eq!(parser.gen_ir().unwrap().graph.get("conv1").unwrap().op, "ConvTranspose");

    let options = ParserOptions::new()
        .set_conv_dispatch(ConvDispatch::AlwaysConv)
        .infer_data_shape(true);
    let model = parser.with_options(options).gen_ir().unwrap();
    assert_eq!(model.graph.get("conv1").unwrap().op, "Conv");
    assert_eq!(
        model.graph.get("image").unwrap().get_attr("shape").and_then(AttrValue::as_shape).unwrap().dims,
        vec![-1, 8, 8, 3]
    );
}

#[test]
fn test_gen_ir_is_repeatable() {
    let parser = PaddleParser::from_model_config(&network("softmax"), parameter_store()).unwrap();
    let first = parser.gen_ir().unwrap();
    let second = parser.gen_ir().unwrap();
    assert_eq!(first.graph.nodes(), second.graph.nodes());
}

#[test]
fn test_json_export() -> anyhow::Result<()> {
    let parser = PaddleParser::from_model_config(&network(""), ParameterStore::not_loaded())?;
    let model = parser.gen_ir()?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("graph.json");
    model.save_graph(&path)?;

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), model.graph.len());
    assert!(nodes.iter().any(|n| n["name"] == "pool1" && n["op"] == "Pool"));
    Ok(())
}

fn write_parameter_dir(dir: &Path) -> anyhow::Result<()> {
    for (name, tensor) in network_parameters() {
        fs::write(dir.join(name), PaddleModelLoader::encode_parameter(&tensor))?;
    }
    Ok(())
}

fn write_parameter_archive(path: &Path) -> anyhow::Result<()> {
    let encoder = GzEncoder::new(File::create(path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, tensor) in network_parameters() {
        let payload = PaddleModelLoader::encode_parameter(&tensor);
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, payload.as_slice())?;
    }

    // Declared dims for the fc weight
    let config = ParameterConfig {
        name: "_fc1.w0".to_string(),
        size: 320,
        dims: vec![32, 10],
    }
    .encode_to_vec();
    let mut header = tar::Header::new_gnu();
    header.set_size(config.len() as u64);
    header.set_mode(0o644);
    builder.append_data(&mut header, "_fc1.w0.protobuf", config.as_slice())?;

    builder.into_inner()?.finish()?;
    Ok(())
}

#[test]
fn test_load_from_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("model.pb");
    fs::write(&config_path, network("softmax").encode_to_vec())?;

    let params_dir = dir.path().join("params");
    fs::create_dir(&params_dir)?;
    write_parameter_dir(&params_dir)?;

    let parser = PaddleParser::load(&config_path, Some(&params_dir))?;
    assert!(parser.weights_loaded());
    let model = parser.gen_ir()?;
    assert_eq!(model.weights.get("conv1", WeightRole::Weights).unwrap().shape(), &[3, 3, 3, 2]);
    Ok(())
}

#[test]
fn test_load_from_archive() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("params.tar.gz");
    write_parameter_archive(&archive)?;

    let store = PaddleModelLoader::load_parameters(&archive)?;
    assert!(store.weights_loaded());
    assert_eq!(store.len(), network_parameters().len());
    assert_eq!(store.get("_fc1.w0")?.shape(), &[32, 10]);
    assert_eq!(store.get("_bn1.w2")?.to_f32().as_slice().unwrap(), &[3.0, 3.0]);
    Ok(())
}

#[test]
fn test_missing_weights_degrade() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("model.pb");
    fs::write(&config_path, network("").encode_to_vec())?;

    let parser = PaddleParser::load(&config_path, Some(&dir.path().join("absent.tar.gz")))?;
    assert!(!parser.weights_loaded());
    assert!(parser.gen_ir()?.weights.is_empty());
    Ok(())
}

#[test]
fn test_invalid_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("model.pb");
    fs::write(&config_path, ModelConfig::default().encode_to_vec())?;

    assert!(matches!(PaddleParser::load(&config_path, None), Err(Error::InvalidConfig(_))));
    assert!(PaddleParser::load(&dir.path().join("missing.pb"), None).is_err());
    Ok(())
}
