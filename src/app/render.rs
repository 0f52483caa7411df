use std::time::Duration;

use crate::app::model::{Analysis, Book};
use crate::app::store::ViewState;

const BUSY_POLL: Duration = Duration::from_millis(1000);

const STYLE_CSS: &str = r#"body { font-family: sans-serif; background: #f0f2f5; margin: 0; }
main { max-width: 900px; margin: 32px auto; background: white; padding: 24px; border-radius: 8px; }
label { display: block; margin-bottom: 4px; color: #555; }
input[type=text] { width: 100%; box-sizing: border-box; padding: 10px; font-size: 16px; margin-bottom: 16px; }
button { padding: 6px 14px; cursor: pointer; }
button:disabled { cursor: progress; opacity: 0.6; }
table { width: 100%; border-collapse: collapse; margin-top: 24px; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e0e0e0; vertical-align: top; }
.alert { display: flex; justify-content: space-between; align-items: center; background: #fff4e5; color: #663c00; padding: 8px 16px; border-radius: 4px; margin-top: 16px; }
.alert form { margin: 0; }
.panel h3 { margin: 16px 0 8px; }
.panel hr { border: none; border-top: 1px solid #e0e0e0; }
.chip { display: inline-block; background: #e0e0e0; border-radius: 16px; padding: 2px 10px; margin: 0 6px 6px 0; }
"#;

// Swaps in a fresh `#shelf` from `/shelf` while it asks to be polled. The
// fetch form is never replaced, so typing survives in-flight requests.
const POLL_SCRIPT: &str = r#"(function () {
  function schedule(shelf) {
    var ms = shelf && shelf.getAttribute("data-refresh-ms");
    if (ms) { setTimeout(poll, Number(ms)); }
  }
  function poll() {
    fetch("/shelf", { cache: "no-store" })
      .then(function (res) { return res.text(); })
      .then(function (html) {
        document.getElementById("shelf").outerHTML = html;
        var shelf = document.getElementById("shelf");
        var fetching = shelf.getAttribute("data-fetching") === "true";
        var button = document.getElementById("fetch-button");
        button.disabled = fetching;
        button.textContent = fetching ? "Fetching\u2026" : "Fetch Book";
        schedule(shelf);
      })
      .catch(function () { setTimeout(poll, 1000); });
  }
  schedule(document.getElementById("shelf"));
})();
"#;

/// Renders the whole page for one snapshot.
pub fn render_page(state: &ViewState, notification_ttl: Duration) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\">\n");
    out.push_str("  <title>Project Gutenberg</title>\n");
    out.push_str(&format!("  <style>\n{STYLE_CSS}  </style>\n"));
    out.push_str("</head>\n<body>\n<main>\n");
    out.push_str("  <h1>Project Gutenberg</h1>\n");

    render_fetch_form(&mut out, state);
    out.push_str(&render_shelf(state, notification_ttl));

    out.push_str("</main>\n");
    out.push_str(&format!("<script>\n{POLL_SCRIPT}</script>\n"));
    out.push_str("</body>\n</html>\n");
    out
}

/// The part of the page that follows request completions: the warning and
/// the book table. Carries its own poll interval while anything can change.
pub fn render_shelf(state: &ViewState, notification_ttl: Duration) -> String {
    let mut out = format!("  <div id=\"shelf\" data-fetching=\"{}\"", state.fetching);
    if let Some(after) = poll_after(state, notification_ttl) {
        out.push_str(&format!(" data-refresh-ms=\"{}\"", after.as_millis().max(1)));
    }
    out.push_str(">\n");

    if let Some(notification) = &state.notification {
        out.push_str(&format!(
            "  <div class=\"alert\" role=\"alert\">\n    <span>{}</span>\n    <form method=\"post\" action=\"/notification/dismiss\"><input type=\"hidden\" name=\"id\" value=\"{}\"><button type=\"submit\" aria-label=\"Close\">&times;</button></form>\n  </div>\n",
            html_escape(&notification.message),
            notification.id
        ));
    }
    if !state.books.is_empty() {
        render_book_table(&mut out, state);
    }

    out.push_str("  </div>\n");
    out
}

// Busy shelves poll for completions; a warning is re-polled once it has expired.
fn poll_after(state: &ViewState, notification_ttl: Duration) -> Option<Duration> {
    if state.is_busy() {
        return Some(BUSY_POLL);
    }
    state.notification.as_ref().map(|_| notification_ttl)
}

fn render_fetch_form(out: &mut String, state: &ViewState) {
    out.push_str("  <form method=\"post\" action=\"/fetch\">\n");
    out.push_str("    <label for=\"book_id\">Enter Book ID</label>\n");
    out.push_str(&format!(
        "    <input type=\"text\" id=\"book_id\" name=\"book_id\" value=\"{}\" autofocus>\n",
        html_escape(&state.pending_id)
    ));
    if state.fetching {
        out.push_str(
            "    <button type=\"submit\" id=\"fetch-button\" disabled>Fetching&hellip;</button>\n",
        );
    } else {
        out.push_str("    <button type=\"submit\" id=\"fetch-button\">Fetch Book</button>\n");
    }
    out.push_str("  </form>\n");
}

fn render_book_table(out: &mut String, state: &ViewState) {
    out.push_str("  <table>\n    <thead>\n      <tr>");
    for heading in ["Book ID", "Title", "Authors", "Languages", "Actions"] {
        out.push_str(&format!("<th>{heading}</th>"));
    }
    out.push_str("</tr>\n    </thead>\n    <tbody>\n");

    for book in &state.books {
        out.push_str("      <tr>");
        for cell in [
            book.book_id.clone(),
            book.title.clone(),
            book.authors.clone(),
            book.languages_label(),
        ] {
            out.push_str(&format!("<td>{}</td>", html_escape(&cell)));
        }
        out.push_str(&format!("<td>{}</td></tr>\n", action_button(state, book)));

        if state.expanded.as_deref() == Some(book.book_id.as_str())
            && let Some(analysis) = &book.analysis
        {
            out.push_str("      <tr><td colspan=\"5\">\n");
            render_analysis_panel(out, analysis);
            out.push_str("      </td></tr>\n");
        }
    }

    out.push_str("    </tbody>\n  </table>\n");
}

fn action_button(state: &ViewState, book: &Book) -> String {
    let segment = urlencoding::encode(&book.book_id);
    if book.analysis.is_some() {
        let label = if state.expanded.as_deref() == Some(book.book_id.as_str()) {
            "Hide Analysis"
        } else {
            "Show Analysis"
        };
        return format!(
            "<form method=\"post\" action=\"/books/{segment}/toggle\"><button type=\"submit\">{label}</button></form>"
        );
    }

    if state.is_analyzing(&book.book_id) {
        format!(
            "<form method=\"post\" action=\"/books/{segment}/analyze\"><button type=\"submit\" disabled>Analyzing&hellip;</button></form>"
        )
    } else {
        format!(
            "<form method=\"post\" action=\"/books/{segment}/analyze\"><button type=\"submit\">Analyze</button></form>"
        )
    }
}

fn render_analysis_panel(out: &mut String, analysis: &Analysis) {
    out.push_str("        <div class=\"panel\">\n");

    push_section(out, "Summary", &paragraph(&analysis.summary));
    let chips: String = analysis
        .themes
        .iter()
        .map(|theme| format!("<span class=\"chip\">{}</span>", html_escape(theme)))
        .collect();
    push_section(out, "Themes", &format!("<div>{chips}</div>"));

    if !analysis.main_characters.is_empty() {
        let items: String = analysis
            .main_characters
            .iter()
            .map(|c| {
                format!(
                    "<li><strong>{}</strong>: {}</li>",
                    html_escape(&c.name),
                    html_escape(&c.description)
                )
            })
            .collect();
        push_section(out, "Main Characters", &format!("<ul>{items}</ul>"));
    }
    if !analysis.main_places.is_empty() {
        let chips: String = analysis
            .main_places
            .iter()
            .map(|place| format!("<span class=\"chip\">{}</span>", html_escape(place)))
            .collect();
        push_section(out, "Main Places", &format!("<div>{chips}</div>"));
    }

    push_section(out, "Target Audience", &paragraph(&analysis.target_audience));
    push_section(out, "Writing Style", &paragraph(&analysis.writing_style));
    let insights: String = analysis
        .key_insights
        .iter()
        .map(|insight| format!("<p>&bull; {}</p>", html_escape(insight)))
        .collect();
    push_section(out, "Key Insights", &insights);
    push_section(
        out,
        "Sentiment Analysis",
        &paragraph(&analysis.sentiment_analysis),
    );

    out.push_str("        </div>\n");
}

fn push_section(out: &mut String, heading: &str, body_html: &str) {
    if !out.ends_with("<div class=\"panel\">\n") {
        out.push_str("          <hr>\n");
    }
    out.push_str(&format!("          <h3>{heading}</h3>\n"));
    out.push_str(&format!("          {body_html}\n"));
}

fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", html_escape(text))
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
