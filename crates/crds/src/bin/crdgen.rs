//! Prints the ScalingWindow CustomResourceDefinition as YAML.
//!
//! ```sh
//! cargo run -p crds --bin crdgen > config/crd/scalingwindows.yaml
//! ```

use crds::ScalingWindow;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crd = ScalingWindow::crd();
    print!("{}", serde_yaml::to_string(&crd)?);
    Ok(())
}
