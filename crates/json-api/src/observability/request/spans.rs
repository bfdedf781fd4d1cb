//! Route templates for span names and metric labels.

use uuid::Uuid;

const TRACKING_TOKEN_PREFIX: &str = "trk_";

/// Replace identifiers in `path` with placeholders so routes group together.
///
/// UUID segments become `{uuid}`, tracking tokens become `{token}` and channel keys
/// such as `job:<uuid>` keep their scope but lose the identifier.
pub(super) fn route_template(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let segments: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(template_segment)
        .collect();

    format!("/{}", segments.join("/"))
}

fn template_segment(segment: &str) -> String {
    if Uuid::parse_str(segment).is_ok() {
        return "{uuid}".to_owned();
    }

    if segment.starts_with(TRACKING_TOKEN_PREFIX) {
        return "{token}".to_owned();
    }

    match segment.split_once(':') {
        Some((scope, id)) if Uuid::parse_str(id).is_ok() => format!("{scope}:{{uuid}}"),
        _ => segment.to_owned(),
    }
}
