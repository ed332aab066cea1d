//! HTTP span helpers.

use uuid::Uuid;

/// `METHOD /path` with identifier segments replaced by their route parameter.
pub(super) fn request_span_name(method: &str, path: &str) -> String {
    format!("{method} {}", route_template(path))
}

fn route_template(path: &str) -> String {
    let mut template = String::new();
    let mut previous = "";

    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        template.push('/');

        if previous == "custom-prints" {
            template.push_str("{request}");
        } else if Uuid::parse_str(segment).is_ok() {
            template.push_str("{session}");
        } else {
            template.push_str(segment);
        }

        previous = segment;
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}
