use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{h_flex, v_flex};

use bom_core::{BomNode, NodeKind};
use gpui_bom_tree::{BomTreeEntry, BomTreeEvent, BomTreeRowState, BomTreeState, bom_tree};

pub struct BomEditorExample {
    tree: Entity<BomTreeState>,
    selected: Option<String>,
    last_warnings: Vec<String>,
    reorder_count: usize,
}

impl BomEditorExample {
    pub fn view(window: &mut Window, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| Self::new(window, cx))
    }

    fn new(_window: &mut Window, cx: &mut Context<Self>) -> Self {
        let tree = cx.new(|cx| {
            BomTreeState::new(cx)
                .row_height(px(30.))
                .items(demo_bom())
                .expand("bike")
                .expand("frame")
                .expand("drivetrain")
        });

        cx.subscribe(&tree, |this, _, event: &BomTreeEvent, cx| {
            match event {
                BomTreeEvent::Selected(node) => {
                    this.selected = node
                        .as_ref()
                        .map(|node| format!("{} ({})", node.name, node.kind.label()));
                }
                BomTreeEvent::Reordered { warnings, .. } => {
                    // The host owns the canonical tree from here: persist it,
                    // push it onto an undo stack, or just display it.
                    this.reorder_count += 1;
                    this.last_warnings = warnings.clone();
                }
            }
            cx.notify();
        })
        .detach();

        Self {
            tree,
            selected: None,
            last_warnings: Vec::new(),
            reorder_count: 0,
        }
    }
}

impl Render for BomEditorExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let tree_dump = format_tree(self.tree.read(cx).root_items());
        let selected = self
            .selected
            .clone()
            .unwrap_or_else(|| "<none>".to_string());

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(
                        div()
                            .text_xl()
                            .font_weight(FontWeight::BOLD)
                            .child("BOM Tree Editor"),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(
                                "Drag an item onto another to re-parent it. Moves that would \
                                 create a cycle are denied; risky kind pairings go through with \
                                 a warning.",
                            ),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!(
                                "Selected: {selected}    Drops applied: {}",
                                self.reorder_count
                            )),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(520.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Tree"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(bom_tree(
                                        &self.tree,
                                        move |ix, entry, row_state, _window, cx| {
                                            render_bom_row(ix, entry, row_state, cx)
                                        },
                                    )),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Canonical tree"),
                            )
                            .child(
                                v_flex()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .p(px(12.))
                                    .gap_y_2()
                                    .child(render_tree_dump(tree_dump))
                                    .when(!self.last_warnings.is_empty(), |this| {
                                        this.child(render_warnings(
                                            &self.last_warnings,
                                            theme.warning,
                                        ))
                                    }),
                            ),
                    ),
            )
    }
}

fn render_bom_row(
    ix: usize,
    entry: &BomTreeEntry,
    row_state: BomTreeRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let indent = px(16.) * entry.depth();
    let node = entry.node();

    let arrow = if entry.has_children() {
        if entry.is_expanded() { "▾" } else { "▸" }
    } else {
        ""
    };
    let quantity = format!("{} {}", node.quantity, node.unit);

    ListItem::new(ix)
        .pl(px(10.) + indent)
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(
            h_flex()
                .w_full()
                .items_center()
                .justify_between()
                .child(
                    h_flex()
                        .gap_x_2()
                        .items_center()
                        .child(
                            div()
                                .w(px(12.))
                                .text_color(theme.muted_foreground)
                                .child(arrow),
                        )
                        .child(node.name.clone())
                        .child(
                            div()
                                .text_xs()
                                .text_color(theme.muted_foreground)
                                .child(node.kind.label()),
                        ),
                )
                .child(
                    div()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(quantity),
                ),
        )
}

fn render_tree_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn render_warnings(warnings: &[String], color: Hsla) -> impl IntoElement {
    let lines = warnings
        .iter()
        .map(|warning| format!("warning: {warning}"))
        .map(move |line| div().text_sm().text_color(color).child(line));
    v_flex().gap_y_0p5().children(lines)
}

fn format_tree(items: &[BomNode]) -> String {
    fn walk(items: &[BomNode], depth: usize, out: &mut String) {
        for item in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&item.name);
            out.push_str(&format!(" ({} {})", item.quantity, item.unit));
            out.push('\n');
            walk(&item.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(items, 0, &mut out);
    out
}

fn demo_bom() -> Vec<BomNode> {
    vec![
        BomNode::new("bike", "City Bike 28\"", NodeKind::Assembly)
            .child(
                BomNode::new("frame", "Frame kit", NodeKind::Subassembly)
                    .child(
                        BomNode::new("tube-set", "Steel tube set", NodeKind::Material)
                            .quantity(4.2, "kg"),
                    )
                    .child(BomNode::new("dropouts", "Dropouts", NodeKind::Component).quantity(2.0, "pcs"))
                    .child(
                        BomNode::new("paint", "Powder coat", NodeKind::Material).quantity(0.3, "kg"),
                    ),
            )
            .child(
                BomNode::new("drivetrain", "Drivetrain", NodeKind::Subassembly)
                    .child(BomNode::new("crankset", "Crankset", NodeKind::Component))
                    .child(BomNode::new("chain", "Chain", NodeKind::Component))
                    .child(
                        BomNode::new("grease", "Assembly grease", NodeKind::Material)
                            .quantity(0.05, "kg"),
                    ),
            )
            .child(
                BomNode::new("wheels", "Wheel set", NodeKind::Subassembly)
                    .child(BomNode::new("rim-front", "Front rim", NodeKind::Component))
                    .child(BomNode::new("rim-rear", "Rear rim", NodeKind::Component))
                    .child(BomNode::new("spokes", "Spokes", NodeKind::Component).quantity(64.0, "pcs")),
            )
            .child(BomNode::new("saddle", "Saddle", NodeKind::Component)),
        BomNode::new("spares", "Spare parts box", NodeKind::Assembly)
            .child(BomNode::new("tube", "Inner tube", NodeKind::Component).quantity(2.0, "pcs")),
    ]
}
