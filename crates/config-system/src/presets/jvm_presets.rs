//! JVM and operating system views
//!
//! Chart ids match the metric groups served by the data endpoint.

use crate::View;

fn view(key: &str, name: &str, visible: bool, charts: &[(&str, &str)]) -> View {
    View {
        key: key.to_string(),
        name: name.to_string(),
        charts: charts.iter().map(|(id, _)| id.to_string()).collect(),
        titles: charts.iter().map(|(_, title)| title.to_string()).collect(),
        visible,
    }
}

/// Create the stock views, in display order
pub fn create_jvm_views() -> Vec<View> {
    vec![
        view(
            "jvm",
            "JVM",
            true,
            &[
                ("cpu", "CPU Load"),
                ("loadAverage", "System Load Average"),
                ("memory", "Memory"),
            ],
        ),
        view(
            "os",
            "Operating System",
            false,
            &[
                ("physicalMemory", "Physical Memory"),
                ("fileDescriptor", "File Descriptor Count"),
            ],
        ),
        view(
            "runtime",
            "Threading & Class Loading",
            false,
            &[("threading", "Threading"), ("classLoading", "Class Loading")],
        ),
    ]
}
