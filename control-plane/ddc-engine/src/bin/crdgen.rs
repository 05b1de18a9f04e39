use ddc_models::{Dataset, JindoCacheRuntime, JindoRuntime, JuiceFSRuntime};
use kube::core::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crds = [
        Dataset::crd(),
        JindoRuntime::crd(),
        JindoCacheRuntime::crd(),
        JuiceFSRuntime::crd(),
    ];
    let docs = crds
        .iter()
        .map(serde_yaml::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", docs.join("---\n"));
    Ok(())
}
