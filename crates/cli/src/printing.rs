use stemflow_sim::base::Compartment;
use stemflow_sim::simulation::{ParameterName, ParameterStore, TimeOutputs};

pub fn print_parameters(store: &ParameterStore) {
    println!("\n📋 Model Parameters");
    for name in ParameterName::ALL {
        println!(
            "  • {} [--adjust {}:up|down, floor {}, step {}]",
            store.display(name),
            name.id(),
            store.lower_bound(name),
            store.increment(name)
        );
    }
    println!();
}

pub fn print_snapshot(outputs: &TimeOutputs) {
    println!(
        "\n⏱  Time {:.2} (trajectory revision {})",
        outputs.time, outputs.revision
    );

    println!("\n🧫 Population");
    for (compartment, markers) in Compartment::ALL.into_iter().zip(outputs.markers) {
        println!(
            "  • {:<15} {:>12.2}  ({} markers)",
            compartment.as_str(),
            outputs.state[compartment],
            markers
        );
    }

    println!("\n🎯 Status");
    println!("  • Label: {}", outputs.status);
    println!("  • Asset: {}", outputs.asset);
    println!("  • Y-axis max: {:.0}", outputs.y_axis_max);
    println!();
}
