use super::PageModel;
use crate::filter::Facet;
use crate::gallery::{CardView, GalleryView};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
    body { font-family: 'Inter', sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
    header { padding: 1.5rem 2rem; display: flex; gap: 1rem; flex-wrap: wrap; align-items: center; }
    header h1 { margin: 0 1.5rem 0 0; font-size: 1.5rem; }
    select { padding: .4rem .6rem; border-radius: .375rem; border: 1px solid #cbd5e1; }
    #hairstyleContainer { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1.25rem; padding: 0 2rem 2rem; }
    .card { background: #fff; border-radius: .75rem; box-shadow: 0 1px 3px rgba(15, 23, 42, .12); overflow: hidden; padding-bottom: 1rem; }
    .card h3, .card p { margin: .5rem 1rem; }
    .gallery { position: relative; aspect-ratio: 4 / 5; background: #e2e8f0; touch-action: pan-y; }
    .gallery img { position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; display: none; }
    .gallery img.active { display: block; }
    .gallery-nav { position: absolute; top: 50%; transform: translateY(-50%); border: 0; border-radius: 9999px; width: 2rem; height: 2rem; background: rgba(255, 255, 255, .8); cursor: pointer; }
    .gallery-nav.prev { left: .5rem; }
    .gallery-nav.next { right: .5rem; }
    .gallery-dots { position: absolute; bottom: .5rem; width: 100%; text-align: center; }
    .dot { display: inline-block; width: .5rem; height: .5rem; margin: 0 .15rem; border-radius: 9999px; background: rgba(255, 255, 255, .5); }
    .dot.active { background: #fff; }
    .empty, .error { grid-column: 1 / -1; text-align: center; padding: 2rem; }
    .error { color: #b91c1c; }
"#;

fn render_select(facet: Facet, values: &[String], selected: Option<&str>) -> String {
    let mut out = format!(
        "<select id=\"{0}\" name=\"{0}\">\n      <option value=\"\">any {1}</option>\n",
        facet.control_name(),
        facet.label()
    );
    for v in values {
        let sel = if selected == Some(v.as_str()) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "      <option value=\"{0}\"{1}>{0}</option>\n",
            escape_html(v),
            sel
        ));
    }
    out.push_str("    </select>");
    out
}

fn render_card(card: &CardView) -> String {
    let mut gallery = String::from("<div class=\"gallery\">\n");
    for img in &card.images {
        gallery.push_str(&format!(
            "        <img src=\"{}\" alt=\"{}\"{} loading=\"lazy\">\n",
            escape_html(&img.src),
            escape_html(&card.name),
            if img.active { " class=\"active\"" } else { "" }
        ));
    }
    if card.has_nav {
        gallery.push_str(
            "        <button class=\"gallery-nav prev\" aria-label=\"Previous image\">&lsaquo;</button>\n",
        );
        gallery.push_str(
            "        <button class=\"gallery-nav next\" aria-label=\"Next image\">&rsaquo;</button>\n",
        );
        gallery.push_str("        <div class=\"gallery-dots\">");
        for active in &card.dots {
            gallery.push_str(if *active {
                "<span class=\"dot active\"></span>"
            } else {
                "<span class=\"dot\"></span>"
            });
        }
        gallery.push_str("</div>\n");
    }
    gallery.push_str("      </div>");

    format!(
        r#"    <div class="card" data-slot="{slot}"{tab}>
      {gallery}
      <h3>{name}</h3>
      <p><strong>Length:</strong> {length}</p>
      <p><strong>Style:</strong> {style}</p>
      <p>{description}</p>
    </div>
"#,
        slot = card.slot,
        tab = if card.has_nav { " tabindex=\"0\"" } else { "" },
        gallery = gallery,
        name = escape_html(&card.name),
        length = escape_html(&card.length),
        style = escape_html(&card.style),
        description = escape_html(&card.description),
    )
}

fn render_document(controls: &str, container: &str) -> Vec<u8> {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Hairstyle Gallery</title>
  <style>{STYLE}</style>
</head>
<body>
  <header>
    <h1>Hairstyles</h1>
    {controls}
  </header>
  <main id="hairstyleContainer">
{container}  </main>
</body>
</html>
"#
    )
    .into_bytes()
}

/// Static snapshot of the gallery. Selects, nav buttons and dots mirror the
/// current state; the page ships no script.
pub fn render_html(page: &PageModel) -> Vec<u8> {
    let controls = [
        render_select(Facet::Length, &page.lengths, page.filter.get(Facet::Length)),
        render_select(Facet::Style, &page.styles, page.filter.get(Facet::Style)),
        render_select(
            Facet::FaceShape,
            &page.face_shapes,
            page.filter.get(Facet::FaceShape),
        ),
    ]
    .join("\n    ");

    let container = match &page.gallery {
        GalleryView::NoResults => {
            "    <p class=\"empty\">No hairstyles match the selected filters.</p>\n".to_string()
        }
        GalleryView::Cards(cards) => cards.iter().map(render_card).collect::<String>(),
    };

    render_document(&controls, &container)
}

/// Page shown when the hairstyle data could not be loaded. The container
/// stays empty apart from the message.
pub fn render_error_html(message: &str) -> Vec<u8> {
    let container = format!(
        "    <p class=\"error\">Could not load hairstyles: {}<br/>Reload the page to try again.</p>\n",
        escape_html(message)
    );
    render_document("", &container)
}
