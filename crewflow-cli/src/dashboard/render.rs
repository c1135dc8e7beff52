//! HTML rendering for the dashboard pages.

use crewflow::config::{CrewConfig, ModelProvider};
use crewflow::core::{ArtifactKind, StageEvent};
use crewflow::pipeline::PipelineResult;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use std::fmt::Write as _;

/// Topic pre-filled in the run form.
pub const DEFAULT_TOPIC: &str = "LLM observability best practices";

const TITLE: &str = "Researcher \u{b7} Writer \u{b7} Reviewer";

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:860px;margin:2rem auto;\
padding:0 1rem;line-height:1.5}label{display:block;margin-top:.75rem}\
input[type=text],input[type=number],select{width:100%;padding:.4rem}\
.warning{background:#fff4e5;border:1px solid #f0a040;padding:.6rem}\
.error{background:#fdecea;border:1px solid #e06060;padding:.6rem;white-space:pre-wrap}\
.tip{color:#555;font-size:.9rem}details{margin-top:1rem}";

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

/// Renders markdown to HTML. Raw HTML in the input is shown as text and
/// `javascript:` links are dropped.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn is_script_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("javascript:") || url.starts_with("vbscript:") || url.starts_with("data:")
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{TITLE}</title><style>{STYLE}</style></head>\
         <body><h1>{TITLE}</h1>{body}</body></html>"
    )
}

fn provider_option(current: ModelProvider, provider: ModelProvider) -> String {
    let selected = if current == provider { " selected" } else { "" };
    format!("<option value=\"{0}\"{selected}>{0}</option>", provider.as_str())
}

/// The run form, optionally with a warning above it.
#[must_use]
pub fn index_page(config: &CrewConfig, warning: Option<&str>) -> String {
    let mut body = String::new();

    if let Some(warning) = warning {
        let _ = write!(body, "<p class=\"warning\">{}</p>", escape_html(warning));
    }

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/run\">\
         <label>Topic<input type=\"text\" name=\"topic\" value=\"{topic}\"></label>\
         <label>Provider<select name=\"provider\">{openai}{ollama}</select></label>\
         <label>OpenAI model<input type=\"text\" name=\"openai_model\" value=\"{openai_model}\"></label>\
         <label>Ollama model<input type=\"text\" name=\"ollama_model\" value=\"{ollama_model}\"></label>\
         <label>Max tokens<input type=\"number\" name=\"max_tokens\" min=\"256\" max=\"8192\" \
         step=\"64\" value=\"{max_tokens}\"></label>\
         <label>Temperature<input type=\"number\" name=\"temperature\" min=\"0\" max=\"2\" \
         step=\"0.1\" value=\"{temperature:.1}\"></label>\
         <label><input type=\"checkbox\" name=\"show_files\" checked> Show generated files</label>\
         <p><button type=\"submit\">Run pipeline</button></p></form>\
         <p class=\"tip\">Tip: for local models run <code>ollama pull {ollama_model}</code> \
         and choose the ollama provider.</p>",
        topic = escape_html(DEFAULT_TOPIC),
        openai = provider_option(config.provider, ModelProvider::OpenAi),
        ollama = provider_option(config.provider, ModelProvider::Ollama),
        openai_model = escape_html(&config.openai_model),
        ollama_model = escape_html(&config.ollama_model),
        max_tokens = config.max_tokens,
        temperature = config.temperature,
    );

    page(&body)
}

/// What the result page shows.
#[derive(Debug)]
pub struct RunPage<'a> {
    /// The topic of the run.
    pub topic: &'a str,
    /// The run result.
    pub result: &'a PipelineResult,
    /// Research notes text, or a notice when the file could not be read.
    pub research_notes: &'a str,
    /// Draft text, or a notice when the file could not be read.
    pub draft: &'a str,
    /// Whether to show the intermediate artifacts and their paths.
    pub show_files: bool,
    /// Lifecycle events of the run, in emission order.
    pub events: &'a [StageEvent],
}

/// The final article, the run timeline and, when requested, the
/// intermediate artifacts.
#[must_use]
pub fn result_page(run: &RunPage<'_>) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<p>Topic: <strong>{}</strong></p><h2>{}</h2><article>{}</article>",
        escape_html(run.topic),
        ArtifactKind::Final.title(),
        markdown_to_html(&run.result.result),
    );

    if run.show_files {
        for (kind, text) in [
            (ArtifactKind::ResearchNotes, run.research_notes),
            (ArtifactKind::Draft, run.draft),
        ] {
            let _ = write!(
                body,
                "<details><summary>{}</summary><p><code>{}</code></p>{}</details>",
                kind.title(),
                escape_html(&run.result.path(kind).display().to_string()),
                markdown_to_html(text),
            );
        }
        let _ = write!(
            body,
            "<p>Final article: <code>{}</code></p>",
            escape_html(&run.result.final_path.display().to_string())
        );
    }

    if !run.events.is_empty() {
        body.push_str("<details><summary>Timeline</summary><ol>");
        for event in run.events {
            let _ = write!(body, "<li><code>{}</code> {}", event.timestamp, event.event_type);
            if let Some(stage) = event.data_str("stage") {
                let _ = write!(body, " ({})", escape_html(stage));
            }
            body.push_str("</li>");
        }
        body.push_str("</ol></details>");
    }

    body.push_str("<p><a href=\"/\">Run another topic</a></p>");
    page(&body)
}

/// A failed run, with the error shown verbatim.
#[must_use]
pub fn error_page(topic: &str, error: &str) -> String {
    page(&format!(
        "<p>Topic: <strong>{}</strong></p><h2>Run failed</h2><pre class=\"error\">{}</pre>\
         <p><a href=\"/\">Back</a></p>",
        escape_html(topic),
        escape_html(error),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_markdown_renders_headings_and_links() {
        let html = markdown_to_html("## Key Takeaways\n\n- see [docs](https://example.com)");
        assert!(html.contains("<h2>Key Takeaways</h2>"));
        assert!(html.contains("<a href=\"https://example.com\">docs</a>"));
    }

    #[test]
    fn test_markdown_neutralises_raw_html_and_script_links() {
        let html = markdown_to_html("<script>alert(1)</script>\n\nhi <b>x</b> [y](javascript:alert(1))");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_index_page_defaults_and_warning() {
        let html = index_page(&CrewConfig::default(), Some("Please enter a topic."));
        assert!(html.contains(TITLE));
        assert!(html.contains("value=\"LLM observability best practices\""));
        assert!(html.contains("<option value=\"openai\" selected>openai</option>"));
        assert!(html.contains("value=\"0.2\""));
        assert!(html.contains("ollama pull llama3.1:8b"));
        assert!(html.contains("class=\"warning\">Please enter a topic.</p>"));
        assert!(html.contains("name=\"show_files\" checked"));
    }

    fn result() -> PipelineResult {
        PipelineResult {
            run_id: uuid::Uuid::nil(),
            research_notes: "out/research_notes.md".into(),
            draft: "out/draft.md".into(),
            final_path: "out/final.md".into(),
            result: "# Final".to_string(),
            duration_ms: 1.0,
        }
    }

    #[test]
    fn test_result_page_hides_intermediate_artifacts_unless_asked() {
        let result = result();
        let events = vec![StageEvent::started("run", "research")];
        let mut run = RunPage {
            topic: "rust",
            result: &result,
            research_notes: "notes",
            draft: "draft",
            show_files: false,
            events: &events,
        };

        let hidden = result_page(&run);
        assert!(hidden.contains("<h1>Final</h1>"));
        assert!(!hidden.contains("<summary>Research Notes</summary>"));
        assert!(!hidden.contains("<summary>Draft</summary>"));
        assert!(hidden.contains("stage.started (research)"));

        run.show_files = true;
        let shown = result_page(&run);
        assert!(shown.contains("<summary>Research Notes</summary><p><code>out/research_notes.md</code></p>"));
        assert!(shown.contains("<summary>Draft</summary>"));
        assert!(shown.contains("out/final.md"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = error_page("t", "Stage 'research' failed: <boom>");
        assert!(html.contains("Stage &#39;research&#39; failed: &lt;boom&gt;"));
    }
}
