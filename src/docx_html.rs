use crate::shell::escape_html;
use base64::{engine::general_purpose::STANDARD, Engine};
use docx_rust::document::{
    BodyContent, ParagraphContent, RunContent, TableCellContent, TableRowContent,
};
use docx_rust::formatting::CharacterProperty;
use docx_rust::Docx;

/// Convert a parsed DOCX document body to an HTML fragment
pub fn docx_to_html(docx: &Docx) -> String {
    let mut ctx = ConvertContext {
        docx,
        blocks: Vec::new(),
        lists: ListStack::default(),
    };

    for content in &docx.document.body.content {
        ctx.convert_body_content(content);
    }
    ctx.close_lists();

    ctx.blocks.join("\n")
}

struct ConvertContext<'a> {
    docx: &'a Docx<'a>,
    /// Finished block-level HTML, one entry per line of output
    blocks: Vec<String>,
    lists: ListStack,
}

/// Nested `<ul>`/`<ol>` state while walking list paragraphs
#[derive(Debug, Default)]
struct ListStack {
    /// Tags of the lists currently open, outermost first. The last `<li>`
    /// of every open list is still open.
    open: Vec<&'static str>,
}

impl ListStack {
    /// Open or close nested lists so the item lands at `level` (0-based)
    fn push_item(
        &mut self,
        blocks: &mut Vec<String>,
        level: usize,
        tag: &'static str,
        content: &str,
    ) {
        let depth = level + 1;

        while self.open.len() > depth {
            self.close_innermost(blocks);
        }

        if self.open.len() == depth {
            if self.open.last() == Some(&tag) {
                blocks.push("</li>".to_string());
            } else {
                self.close_innermost(blocks);
            }
        }

        while self.open.len() < depth {
            blocks.push(format!("<{}>", tag));
            self.open.push(tag);
            if self.open.len() < depth {
                blocks.push("<li>".to_string());
            }
        }

        blocks.push(format!("<li>{}", content));
    }

    fn close_innermost(&mut self, blocks: &mut Vec<String>) {
        if let Some(tag) = self.open.pop() {
            blocks.push(format!("</li></{}>", tag));
        }
    }

    fn close_all(&mut self, blocks: &mut Vec<String>) {
        while !self.open.is_empty() {
            self.close_innermost(blocks);
        }
    }
}

impl<'a> ConvertContext<'a> {
    fn convert_body_content(&mut self, content: &BodyContent) {
        match content {
            BodyContent::Paragraph(para) => self.convert_paragraph(para),
            BodyContent::Table(table) => {
                self.close_lists();
                self.convert_table(table);
            }
            BodyContent::Sdt(sdt) => {
                if let Some(ref sdt_content) = sdt.content {
                    for item in &sdt_content.content {
                        self.convert_body_content(item);
                    }
                }
            }
            _ => {}
        }
    }

    fn convert_paragraph(&mut self, para: &docx_rust::document::Paragraph) {
        let mut heading_level: Option<u8> = None;
        let mut numbering: Option<(isize, isize)> = None; // (num_id, level)

        if let Some(ref prop) = para.property {
            if let Some(ref style_id) = prop.style_id {
                heading_level = heading_level_for_style(style_id.value.as_ref());
            }

            if let Some(ref num_prop) = prop.numbering {
                if let (Some(ref id), Some(ref level)) = (&num_prop.id, &num_prop.level) {
                    numbering = Some((id.value, level.value));
                }
            }
        }

        let inline_html = self.collect_inline_content(para);
        let inline_html = inline_html.trim();

        if inline_html.is_empty() {
            return;
        }

        if let Some(level) = heading_level {
            self.close_lists();
            self.blocks
                .push(format!("<h{level}>{}</h{level}>", inline_html, level = level));
            return;
        }

        if let Some((num_id, level)) = numbering {
            let tag = self.resolve_list_tag(num_id, level);
            self.lists
                .push_item(&mut self.blocks, level.max(0) as usize, tag, inline_html);
            return;
        }

        self.close_lists();
        self.blocks.push(format!("<p>{}</p>", inline_html));
    }

    fn close_lists(&mut self) {
        self.lists.close_all(&mut self.blocks);
    }

    fn collect_inline_content(&self, para: &docx_rust::document::Paragraph) -> String {
        let mut result = String::new();

        for pc in &para.content {
            match pc {
                ParagraphContent::Run(run) => {
                    let text = self.collect_run_html(run);
                    if !text.is_empty() {
                        result.push_str(&format_run_html(&text, &run.property));
                    }
                }
                ParagraphContent::Link(link) => {
                    let display = link
                        .content
                        .as_ref()
                        .map(|run| self.collect_run_html(run))
                        .unwrap_or_default();

                    match self.resolve_hyperlink_target(link) {
                        Some(url) => {
                            let href = escape_html(&url);
                            let label = if display.is_empty() {
                                href.clone()
                            } else {
                                display
                            };
                            result.push_str(&format!("<a href=\"{}\">{}</a>", href, label));
                        }
                        None => result.push_str(&display),
                    }
                }
                _ => {}
            }
        }

        result
    }

    /// Escaped text of one run, with breaks and images already as HTML
    fn collect_run_html(&self, run: &docx_rust::document::Run) -> String {
        let mut html = String::new();

        for rc in &run.content {
            match rc {
                RunContent::Text(t) => html.push_str(&escape_html(&t.text)),
                RunContent::Break(_) => html.push_str("<br />"),
                RunContent::Tab(_) => html.push('\t'),
                RunContent::Drawing(drawing) => {
                    if let Some(img) = self.convert_drawing(drawing) {
                        html.push_str(&img);
                    }
                }
                _ => {}
            }
        }

        html
    }

    fn convert_drawing(&self, drawing: &docx_rust::document::Drawing) -> Option<String> {
        if let Some(ref inline) = drawing.inline {
            if let Some(ref graphic) = inline.graphic {
                if let Some(pic) = graphic.data.children.first() {
                    let embed_id = pic.fill.blip.embed.as_ref();
                    let alt = inline.doc_property.descr.as_deref().unwrap_or("");
                    return self.resolve_image(embed_id, alt);
                }
            }
        }

        // Floating images
        if let Some(ref anchor) = drawing.anchor {
            if let Some(ref graphic) = anchor.graphic {
                if let Some(pic) = graphic.data.children.first() {
                    let embed_id = pic.fill.blip.embed.as_ref();
                    let alt = anchor.doc_property.descr.as_deref().unwrap_or("");
                    return self.resolve_image(embed_id, alt);
                }
            }
        }

        None
    }

    /// Inline the image behind a relationship id as a data URI
    fn resolve_image(&self, embed_id: &str, alt: &str) -> Option<String> {
        let target = self
            .docx
            .document_rels
            .as_ref()?
            .relationships
            .iter()
            .find(|r| r.id.as_ref() == embed_id)?
            .target
            .as_ref();

        // Targets are relative to word/, media keys are archive paths
        let suffix = target.trim_start_matches("../").trim_start_matches('/');

        for (path, (_media_type, data)) in &self.docx.media {
            if path.ends_with(suffix) {
                let encoded = STANDARD.encode(data);
                return Some(format!(
                    "<img alt=\"{}\" src=\"data:{};base64,{}\" />",
                    escape_html(alt),
                    mime_for(suffix),
                    encoded
                ));
            }
        }

        None
    }

    fn resolve_hyperlink_target(&self, link: &docx_rust::document::Hyperlink) -> Option<String> {
        if let Some(ref anchor) = link.anchor {
            return Some(format!("#{}", anchor));
        }

        if let Some(ref id) = link.id {
            if let Some(ref rels) = self.docx.document_rels {
                for r in &rels.relationships {
                    if r.id.as_ref() == id.as_ref() {
                        return Some(r.target.to_string());
                    }
                }
            }
        }

        None
    }

    fn resolve_list_tag(&self, num_id: isize, level: isize) -> &'static str {
        let Some(ref numbering) = self.docx.numbering else {
            return "ul";
        };

        for num in &numbering.numberings {
            if num.num_id != Some(num_id) {
                continue;
            }
            let Some(ref aid) = num.abstract_num_id else {
                continue;
            };

            for abstract_num in &numbering.abstract_numberings {
                if abstract_num.abstract_num_id != aid.value {
                    continue;
                }
                for lvl in &abstract_num.levels {
                    if lvl.i_level != Some(level) {
                        continue;
                    }
                    if let Some(ref fmt) = lvl.number_format {
                        return match fmt.value.as_ref() {
                            "decimal" | "upperRoman" | "lowerRoman" | "upperLetter"
                            | "lowerLetter" => "ol",
                            _ => "ul",
                        };
                    }
                }
            }
        }

        "ul"
    }

    fn convert_table(&mut self, table: &docx_rust::document::Table) {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for row in &table.rows {
            let mut cells: Vec<String> = Vec::new();

            for cell_content in &row.cells {
                if let TableRowContent::TableCell(cell) = cell_content {
                    cells.push(self.collect_cell_html(cell));
                }
            }

            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        if rows.is_empty() {
            return;
        }

        self.blocks.push("<table>".to_string());
        for row in &rows {
            let cells: String = row
                .iter()
                .map(|cell| format!("<td>{}</td>", cell))
                .collect();
            self.blocks.push(format!("<tr>{}</tr>", cells));
        }
        self.blocks.push("</table>".to_string());
    }

    fn collect_cell_html(&self, cell: &docx_rust::document::TableCell) -> String {
        let mut parts: Vec<String> = Vec::new();

        for tc in &cell.content {
            let TableCellContent::Paragraph(para) = tc;
            let html = self.collect_inline_content(para);
            let trimmed = html.trim();
            if !trimmed.is_empty() {
                parts.push(format!("<p>{}</p>", trimmed));
            }
        }

        parts.join("")
    }
}

fn heading_level_for_style(style_id: &str) -> Option<u8> {
    match style_id {
        "Heading1" | "heading1" | "heading 1" => Some(1),
        "Heading2" | "heading2" | "heading 2" => Some(2),
        "Heading3" | "heading3" | "heading 3" => Some(3),
        "Heading4" | "heading4" | "heading 4" => Some(4),
        "Heading5" | "heading5" | "heading 5" => Some(5),
        "Heading6" | "heading6" | "heading 6" => Some(6),
        "Title" | "title" => Some(1),
        "Subtitle" | "subtitle" => Some(2),
        _ => None,
    }
}

/// Wrap already-escaped run HTML in inline formatting tags
fn format_run_html(html: &str, props: &Option<CharacterProperty>) -> String {
    let Some(props) = props else {
        return html.to_string();
    };

    if html.trim().is_empty() {
        return html.to_string();
    }

    let is_bold = props
        .bold
        .as_ref()
        .map(|b| b.value != Some(false))
        .unwrap_or(false);
    let is_italic = props
        .italics
        .as_ref()
        .map(|i| i.value != Some(false))
        .unwrap_or(false);
    let is_strike = props.strike.is_some() || props.dstrike.is_some();

    let mut result = html.to_string();
    if is_strike {
        result = format!("<s>{}</s>", result);
    }
    if is_italic {
        result = format!("<em>{}</em>", result);
    }
    if is_bold {
        result = format!("<strong>{}</strong>", result);
    }

    result
}

fn mime_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}
