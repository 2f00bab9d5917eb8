//! Reconciling the window against the host's line nodes.
//!
//! Walks the window and the container in lockstep: entries without a node
//! get one inserted at the cursor, stray nodes before an entry's node are
//! removed, dirty entries are patched in place, and whatever follows the
//! last entry is dropped.

use tracing::{trace, warn};

use super::content::{ContentContext, build_gutter, build_line_render};
use super::line_view::{DirtyAspects, LineMeasure, LineView};
use super::{ExternalMeasure, FoldIndex};
use crate::config::EditorOptions;
use crate::error::{Error, Result};
use crate::highlight::Highlighter;
use crate::host::{DomHost, LineRender, NodeId};
use crate::Editor;

/// Mutable state shared by the build helpers.
pub(crate) struct BuildState<'a> {
    pub highlighter: &'a mut Highlighter,
    pub external: &'a mut Option<ExternalMeasure>,
    pub view_range: (usize, usize),
}

/// Content for the visual line at `line`, reusing an off-screen build of
/// the same line when there is one.
pub(crate) fn line_content(
    ctx: &ContentContext<'_>,
    build: &mut BuildState<'_>,
    host: &mut dyn DomHost,
    line: usize,
    size: usize,
) -> (LineRender, LineMeasure) {
    if let Some(ext) = build
        .external
        .take_if(|ext| ext.line == line && ext.size == size)
    {
        host.clear_measure();
        let measure = ext
            .view
            .measure
            .unwrap_or_else(|| LineMeasure::from_content(&ext.render.content));
        return (ext.render, measure);
    }
    let render = build_line_render(ctx, build.highlighter, line, size, build.view_range);
    let measure = LineMeasure::from_content(&render.content);
    (render, measure)
}

/// Bring a drawn line up to date with its dirty aspects.
pub(crate) fn update_line_for_changes(
    ctx: &ContentContext<'_>,
    build: &mut BuildState<'_>,
    host: &mut dyn DomHost,
    view: &mut LineView,
    line: usize,
) {
    let Some(node) = view.node else {
        return;
    };
    let changes = std::mem::take(&mut view.changes);
    if changes.contains(DirtyAspects::TEXT) {
        let (render, measure) = line_content(ctx, build, host, line, view.size);
        host.replace_text(node, &render.content);
        view.measure = Some(measure);
        if render.classes != view.classes {
            host.set_classes(node, &render.classes);
            view.classes = render.classes;
        }
    }
    if changes.contains(DirtyAspects::GUTTER) {
        host.set_gutter(node, build_gutter(ctx, line).as_ref());
    }
    if changes.contains(DirtyAspects::CLASS) {
        let classes = ctx
            .decorations
            .get(line)
            .map(|d| d.classes.clone())
            .unwrap_or_default();
        host.set_classes(node, &classes);
        view.classes = classes;
    }
    if changes.contains(DirtyAspects::WIDGET) {
        let widgets: Vec<_> = (line..line + view.size)
            .flat_map(|l| ctx.decorations.widget_renders(l))
            .collect();
        host.set_widgets(node, &widgets);
    }
}

fn remove_and_advance(host: &mut dyn DomHost, node: NodeId) -> Option<NodeId> {
    let next = host.next_line_node(node);
    host.remove_line(node);
    next
}

impl<H: DomHost> Editor<H> {
    /// Make the host's line container match the window.
    ///
    /// Line-number labels from `update_numbers_from` on are rewritten. A
    /// container that no longer matches the window is rebuilt from scratch.
    pub(crate) fn patch_display(&mut self, update_numbers_from: Option<usize>) {
        if let Err(err) = self.try_patch_display(update_numbers_from) {
            warn!(%err, "line container out of sync; rebuilding window");
            let (from, to) = (self.display.window.from(), self.display.window.to());
            self.reset_view();
            let first = self.doc.first_line();
            let end = self.doc_end();
            let d = &mut self.display;
            let lines = FoldIndex::new(&d.folds, first, end);
            d.window.adjust_view(&lines, from, to);
            if let Err(err) = self.try_patch_display(Some(from)) {
                warn!(%err, "rebuild failed");
            }
        }
    }

    fn try_patch_display(&mut self, update_numbers_from: Option<usize>) -> Result<()> {
        let Self {
            doc,
            display,
            host,
            options,
            highlighter,
            ..
        } = self;
        let host: &mut dyn DomHost = host;
        let options: &EditorOptions = options;
        let ctx = ContentContext {
            doc: doc.as_ref(),
            folds: &display.folds,
            decorations: &display.decorations,
            options,
        };
        let mut build = BuildState {
            highlighter,
            external: &mut display.external,
            view_range: (display.window.from(), display.window.to()),
        };
        let mut cur = host.first_line_node();
        let mut line_n = display.window.from();
        let (mut inserted, mut patched) = (0usize, 0usize);

        for view in display.window.lines_mut() {
            if view.hidden {
                // Nothing to draw.
            } else if view.node.is_none_or(|n| !host.is_attached(n)) {
                let (render, measure) = line_content(&ctx, &mut build, host, line_n, view.size);
                let node = host.insert_line(&render, cur);
                view.node = Some(node);
                view.measure = Some(measure);
                view.classes = render.classes;
                view.changes = DirtyAspects::empty();
                inserted += 1;
            } else {
                let node = view.node.ok_or(Error::InconsistentView { line: line_n })?;
                while cur != Some(node) {
                    let stray = cur.ok_or(Error::InconsistentView { line: line_n })?;
                    cur = remove_and_advance(host, stray);
                }
                let mut update_number =
                    options.line_numbers && update_numbers_from.is_some_and(|from| from <= line_n);
                if !view.changes.is_empty() {
                    if view.changes.contains(DirtyAspects::GUTTER) {
                        update_number = false;
                    }
                    update_line_for_changes(&ctx, &mut build, host, view, line_n);
                    patched += 1;
                }
                if update_number {
                    host.set_line_number(node, &options.line_number_for(line_n));
                }
                cur = host.next_line_node(node);
            }
            line_n += view.size;
        }
        let mut removed = 0usize;
        while let Some(stray) = cur {
            cur = remove_and_advance(host, stray);
            removed += 1;
        }
        trace!(inserted, patched, removed, "patched line container");
        Ok(())
    }

    /// Patch the dirty aspects of one drawn entry outside a redraw.
    pub(crate) fn refresh_line_view(&mut self, index: usize, line: usize) {
        let Self {
            doc,
            display,
            host,
            options,
            highlighter,
            ..
        } = self;
        let host: &mut dyn DomHost = host;
        let options: &EditorOptions = options;
        let ctx = ContentContext {
            doc: doc.as_ref(),
            folds: &display.folds,
            decorations: &display.decorations,
            options,
        };
        let mut build = BuildState {
            highlighter,
            external: &mut display.external,
            view_range: (display.window.from(), display.window.to()),
        };
        if let Some(view) = display.window.lines_mut().get_mut(index) {
            update_line_for_changes(&ctx, &mut build, host, view, line);
        }
    }

    /// Build the visual line holding `line` in the measuring container.
    /// Returns its first line and node.
    pub(crate) fn update_external_measurement(&mut self, line: usize) -> (usize, NodeId) {
        let start = self.display.folds.visual_line_no(line);
        let (size, _) = self.display.folds.visual_line_at(start);
        let view_range = (self.display.window.from(), self.display.window.to());
        let render = {
            let Self {
                doc,
                display,
                options,
                highlighter,
                ..
            } = self;
            let ctx = ContentContext {
                doc: doc.as_ref(),
                folds: &display.folds,
                decorations: &display.decorations,
                options: &*options,
            };
            build_line_render(&ctx, highlighter, start, size, view_range)
        };
        let node = self.host.render_measure_line(&render);
        let mut view = LineView::new(size, false);
        view.node = Some(node);
        view.measure = Some(LineMeasure::from_content(&render.content));
        view.classes = render.classes.clone();
        trace!(line = start, size, "external measurement");
        self.display.external = Some(ExternalMeasure {
            line: start,
            size,
            view,
            render,
        });
        (start, node)
    }
}
