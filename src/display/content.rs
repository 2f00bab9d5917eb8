//! Building the render description of one visual line.

use crate::config::EditorOptions;
use crate::highlight::{Highlighter, Token};
use crate::host::{GutterRender, LineContent, LineRender, MapEntry, Span, WidgetRender};
use crate::text::Document;

use super::decorations::Decorations;
use super::folds::Folds;

/// Id of the line-number gutter in the gutter list handed to the host.
pub const LINE_NUMBER_GUTTER: &str = "linenumbers";

/// Read-only inputs of line building.
pub(crate) struct ContentContext<'a> {
    pub doc: &'a dyn Document,
    pub folds: &'a Folds,
    pub decorations: &'a Decorations,
    pub options: &'a EditorOptions,
}

/// Split `text` into styled spans, appending them and their map entries.
fn push_token_spans(text: &str, tokens: &[Token], content: &mut LineContent) {
    if text.is_empty() {
        return;
    }
    // Char offset for each byte boundary.
    let mut char_at = vec![0usize; text.len() + 1];
    let mut count = 0;
    for (byte, c) in text.char_indices() {
        char_at[byte] = count;
        count += 1;
        for slot in &mut char_at[byte + 1..byte + c.len_utf8()] {
            *slot = count;
        }
    }
    char_at[text.len()] = count;

    let mut push = |from_byte: usize, to_byte: usize, class: Option<&str>| {
        if from_byte >= to_byte {
            return;
        }
        let span = content.spans.len();
        content.spans.push(Span::text(&text[from_byte..to_byte], class));
        content
            .map
            .push(MapEntry::new(char_at[from_byte], char_at[to_byte], span));
    };

    let mut pos = 0;
    for token in tokens {
        let start = token.start.min(text.len()).max(pos);
        let end = token.end.min(text.len());
        if start >= end || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            continue;
        }
        push(pos, start, None);
        push(start, end, token.kind.class_name());
        pos = end;
    }
    push(pos, text.len(), None);
}

/// Render description of the visual line starting at `line` and covering
/// `size` logical lines.
pub(crate) fn build_line_render(
    ctx: &ContentContext<'_>,
    highlighter: &mut Highlighter,
    line: usize,
    size: usize,
    view: (usize, usize),
) -> LineRender {
    let text = ctx.doc.line_text(line);
    let tokens = highlighter.styles_for(ctx.doc, line, view);
    let mut content = LineContent::default();
    push_token_spans(&text, &tokens, &mut content);

    if let Some(fold) = ctx.folds.starting_at(line) {
        let len = text.chars().count();
        let span = content.spans.len();
        let mut marker = Span::widget(ctx.options.fold_marker.clone());
        marker.class = Some("cm-fold-marker".to_string());
        content.spans.push(marker);
        content.map.push(MapEntry::new(len, len, span));
        for rest in fold.from + 1..=fold.to {
            let rest_len = ctx.doc.content_length(rest);
            content.rest_maps.push(vec![MapEntry::new(0, rest_len, span)]);
        }
    }
    if content.map.is_empty() {
        let span = content.spans.len();
        content.spans.push(Span::widget(""));
        content.map.push(MapEntry::new(0, 0, span));
    }

    let classes = ctx
        .decorations
        .get(line)
        .map(|d| d.classes.clone())
        .unwrap_or_default();
    let gutter = build_gutter(ctx, line);
    let widgets: Vec<WidgetRender> = (line..line + size.max(1))
        .flat_map(|l| ctx.decorations.widget_renders(l))
        .collect();

    LineRender {
        content,
        gutter,
        classes,
        widgets,
    }
}

/// Gutter elements for `line`, or `None` when no gutters are configured.
pub(crate) fn build_gutter(ctx: &ContentContext<'_>, line: usize) -> Option<GutterRender> {
    if !ctx.options.line_numbers && ctx.options.gutters.is_empty() {
        return None;
    }
    let deco = ctx.decorations.get(line);
    let markers = ctx
        .options
        .gutters
        .iter()
        .filter_map(|id| {
            deco.and_then(|d| d.markers.get(id))
                .map(|m| (id.clone(), m.clone()))
        })
        .collect();
    Some(GutterRender {
        line_number: ctx
            .options
            .line_numbers
            .then(|| ctx.options.line_number_for(line)),
        markers,
        class: deco.and_then(|d| d.classes.gutter.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::TokenKind;
    use crate::host::SpanKind;
    use crate::text::RopeDocument;
    use crate::display::folds::FoldKind;

    #[test]
    fn tokens_become_spans_with_char_maps() {
        let mut content = LineContent::default();
        let text = "é = 1";
        let tokens = vec![Token::new(TokenKind::Variable, 0, 2), Token::new(TokenKind::Number, 5, 6)];
        push_token_spans(text, &tokens, &mut content);
        let texts: Vec<&str> = content.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["é", " = ", "1"]);
        assert_eq!(content.map[1], MapEntry::new(1, 4, 1));
        assert_eq!(content.map[2], MapEntry::new(4, 5, 2));
        assert_eq!(content.spans[2].class.as_deref(), Some("cm-number"));
    }

    #[test]
    fn empty_line_gets_a_placeholder() {
        let doc = RopeDocument::from_str("\nx");
        let folds = Folds::new();
        let decorations = Decorations::new(0, 2);
        let options = EditorOptions::with_line_numbers();
        let ctx = ContentContext {
            doc: &doc,
            folds: &folds,
            decorations: &decorations,
            options: &options,
        };
        let mut hl = Highlighter::plain(0, 2);
        let render = build_line_render(&ctx, &mut hl, 0, 1, (0, 2));
        assert_eq!(render.content.spans[0].kind, SpanKind::Widget);
        assert_eq!(render.content.map, vec![MapEntry::new(0, 0, 0)]);
        assert_eq!(render.gutter.and_then(|g| g.line_number).as_deref(), Some("1"));
    }

    #[test]
    fn folded_line_maps_rest_lines_to_marker() {
        let doc = RopeDocument::from_str("ab\ncd\nef");
        let mut folds = Folds::new();
        folds.add(0, 2, FoldKind::Fold);
        let decorations = Decorations::new(0, 3);
        let options = EditorOptions::default();
        let ctx = ContentContext {
            doc: &doc,
            folds: &folds,
            decorations: &decorations,
            options: &options,
        };
        let mut hl = Highlighter::plain(0, 3);
        let render = build_line_render(&ctx, &mut hl, 0, 3, (0, 3));
        assert_eq!(render.content.map.last(), Some(&MapEntry::new(2, 2, 1)));
        assert_eq!(render.content.rest_maps.len(), 2);
        assert_eq!(render.content.rest_maps[1], vec![MapEntry::new(0, 2, 1)]);
        assert!(render.gutter.is_none());
    }
}
