//! # CRD generator
//!
//! Prints the CustomResourceDefinition YAML for all resources owned by the
//! controller.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/external-data.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;

use external_data_controller::crd::{DataSource, ProviderConfig, ProviderConfigUsage};

fn main() {
    let crds = [
        DataSource::crd(),
        ProviderConfig::crd(),
        ProviderConfigUsage::crd(),
    ];

    for crd in &crds {
        match serde_yaml::to_string(crd) {
            Ok(yaml) => println!("---\n{yaml}"),
            Err(e) => {
                eprintln!("Failed to serialize CRD to YAML: {e}");
                std::process::exit(1);
            }
        }
    }
}
