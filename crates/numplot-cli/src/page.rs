//! HTML form page, rendered from the embedded `assets/index.html` template.

use rust_embed::RustEmbed;

use numplot_core::Method;
use numplot_store::LegendEntry;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Result block shown under the form after a submission.
#[derive(Debug, Default)]
pub struct ResultView {
    pub summary: String,
    /// Stored image name, served under `/static/img/`.
    pub image: Option<String>,
    pub legend: Vec<LegendEntry>,
}

/// Everything the page needs. `data`/`method` echo the last submission.
#[derive(Debug, Default)]
pub struct PageView {
    pub data: String,
    pub method: String,
    pub result: Option<ResultView>,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn template() -> String {
    Assets::get("index.html")
        .map(|f| String::from_utf8_lossy(&f.data).into_owned())
        .unwrap_or_else(|| "<form action=\"/process\" method=\"post\">{{options}}</form>{{result}}".into())
}

fn render_options(selected: &str) -> String {
    let selected = selected.parse::<Method>().ok();
    Method::ALL
        .iter()
        .map(|m| {
            let sel = if Some(*m) == selected { " selected" } else { "" };
            format!("      <option value=\"{m}\"{sel}>{}</option>", m.title())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_result(result: &ResultView) -> String {
    let mut html = String::from("  <section class=\"result\">\n    <h2>Result</h2>\n");
    html.push_str(&format!("    <p>{}</p>\n", escape_html(&result.summary)));
    if let Some(name) = &result.image {
        html.push_str(&format!(
            "    <img src=\"/static/img/{}\" alt=\"plot\">\n",
            escape_html(name)
        ));
    }
    if !result.legend.is_empty() {
        html.push_str("    <ul class=\"legend\">\n");
        for entry in &result.legend {
            html.push_str(&format!(
                "      <li><span style=\"background:{}\"></span>{} ({})</li>\n",
                entry.color,
                escape_html(&entry.label),
                entry.shape
            ));
        }
        html.push_str("    </ul>\n");
    }
    html.push_str("  </section>");
    html
}

/// Substitute `{{key}}` placeholders in one pass over `template`. Inserted
/// values are never rescanned, and unknown placeholders are kept verbatim.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let key = &after[..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn render(view: &PageView) -> String {
    let data = escape_html(&view.data);
    let options = render_options(&view.method);
    let result = view.result.as_ref().map(render_result).unwrap_or_default();
    fill(
        &template(),
        &[
            ("data", data.as_str()),
            ("options", options.as_str()),
            ("result", result.as_str()),
        ],
    )
}
