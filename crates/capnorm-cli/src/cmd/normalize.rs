use crate::output::print_json;
use capnorm_core::{is_canonical, normalize};
use serde::Serialize;

#[derive(Serialize)]
struct Normalized<'a> {
    label: &'a str,
    identifier: String,
    canonical: bool,
}

pub fn run(labels: &[String], json: bool) -> anyhow::Result<()> {
    let results: Vec<Normalized> = labels
        .iter()
        .map(|label| Normalized {
            label,
            identifier: normalize(label),
            canonical: is_canonical(label),
        })
        .collect();

    if json {
        return print_json(&results);
    }
    for r in &results {
        println!("{}", r.identifier);
    }
    Ok(())
}
