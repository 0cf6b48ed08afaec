//! End-to-end demo: build a small classifier, save it, load it back, and
//! run a profiled prediction over a random input.
//!
//! ```text
//! cargo run --example classify
//! ```

use mininn::prelude::*;
use rand::Rng;

const IN_FEATURES: usize = 4;
const HIDDEN: usize = 8;
const CLASSES: usize = 3;

fn random_tensor(rng: &mut impl Rng, shape: &[usize]) -> Result<Tensor> {
    let size: usize = shape.iter().product();
    let data: Vec<f32> = (0..size).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Tensor::from_vec(shape, data)
}

fn build_model(rng: &mut impl Rng) -> Result<Model> {
    let mut model = Model::new();
    model.add_layer(Layer::linear(
        random_tensor(rng, &[IN_FEATURES, HIDDEN])?,
        random_tensor(rng, &[HIDDEN])?,
    )?);
    model.add_layer(Layer::ReLU);
    model.add_layer(Layer::linear(
        random_tensor(rng, &[HIDDEN, CLASSES])?,
        random_tensor(rng, &[CLASSES])?,
    )?);
    model.add_layer(Layer::Softmax);
    model.set_input_shape(vec![IN_FEATURES]);
    model.set_output_shape(vec![CLASSES]);
    Ok(model)
}

fn main() -> Result<()> {
    let mut rng = rand::thread_rng();

    let model = build_model(&mut rng)?;
    println!("built model: {model:?}");

    let path = std::env::temp_dir().join("mininn_classify_demo.minn");
    save_model(&model, &path)?;
    println!("saved to {} (valid: {})", path.display(), is_model_file(&path));

    let mut engine = InferenceEngine::from_file(&path)?;
    engine.enable_profiling(true);

    let input = random_tensor(&mut rng, &[IN_FEATURES])?;
    let probs = engine.predict(&input)?;

    println!("input:  {:?}", input.data());
    println!("output: {:?}", probs.data());
    println!("predicted class: {}", argmax(&probs)?);
    for (rank, (class, p)) in top_k(&probs, CLASSES)?.iter().enumerate() {
        println!("  #{:<2} class {class}  p={p:.4}", rank + 1);
    }

    let stats = engine.last_stats();
    println!(
        "total {:?} across {} layers, ~{} bytes of parameters",
        stats.total_time,
        stats.layer_times.len(),
        stats.memory_usage_bytes
    );

    std::fs::remove_file(&path).ok();
    Ok(())
}
