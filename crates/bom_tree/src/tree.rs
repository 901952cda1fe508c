use std::collections::HashSet;
use std::ops::Range;
use std::rc::Rc;

use bom_core::{
    BomNode, DropTargets, FlattenedRow, MovePolicy, find_node, flatten, move_node,
    partition_drop_targets, validate_move,
};
use gpui::{
    App, AppContext as _, Context, CursorStyle, ElementId, Entity, EntityId, EventEmitter,
    FocusHandle, InteractiveElement as _, IntoElement, ListSizingBehavior, ParentElement as _,
    Pixels, Render, RenderOnce, ScrollStrategy, SharedString, Size, StatefulInteractiveElement as _,
    StyleRefinement, Styled, Window, div, prelude::FluentBuilder as _, px, size,
};
use gpui_component::list::ListItem;
use gpui_component::scroll::{Scrollbar, ScrollbarState};
use gpui_component::{ActiveTheme as _, StyledExt as _, VirtualListScrollHandle, v_virtual_list};

const CONTEXT: &str = "BomTree";
const DEFAULT_ROW_HEIGHT: Pixels = px(30.);

/// Create a [`BomTree`].
pub fn bom_tree<R>(state: &Entity<BomTreeState>, render_item: R) -> BomTree
where
    R: Fn(usize, &BomTreeEntry, BomTreeRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    BomTree::new(state, render_item)
}

#[derive(Clone)]
struct BomTreeDrag {
    tree_id: EntityId,
    item_id: SharedString,
    label: SharedString,
}

struct DragGhost {
    label: SharedString,
}

impl DragGhost {
    fn new(label: SharedString) -> Self {
        Self { label }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(self.label.clone())
    }
}

/// A visible row: the flattened position plus the node it came from.
#[derive(Clone)]
pub struct BomTreeEntry {
    node: BomNode,
    row: FlattenedRow,
}

impl BomTreeEntry {
    #[inline]
    pub fn node(&self) -> &BomNode {
        &self.node
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.row.id
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.row.depth
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.row.has_children
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.row.is_expanded
    }

    #[inline]
    pub fn original_index(&self) -> usize {
        self.row.original_index
    }

    #[inline]
    pub fn parent_id(&self) -> Option<&str> {
        self.row.parent_id.as_deref()
    }
}

/// Whether the hovered row may receive the dragged node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropCandidate {
    Allowed,
    Denied,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BomTreeRowState {
    pub selected: bool,
    pub dragging: bool,
    pub drop_candidate: Option<DropCandidate>,
}

/// Notifications to the embedding host. Selection changes and reorder
/// completions are the only things a host is told about.
#[derive(Clone, Debug)]
pub enum BomTreeEvent {
    Selected(Option<BomNode>),
    /// A drop went through. `items` is the brand-new canonical forest;
    /// `warnings` carries any advisory conditions from the move policy so the
    /// host can surface them.
    Reordered {
        items: Vec<BomNode>,
        warnings: Vec<String>,
    },
}

/// Per-gesture drag bookkeeping.
///
/// Populated on drag-start with the prevalidated target sets, cleared on
/// drag-end or drop. Hover legality is a set lookup; the tree is never walked
/// on the hover path.
#[derive(Clone, Debug, Default)]
struct DragGesture {
    dragged_id: Option<String>,
    drag_over_id: Option<String>,
    targets: DropTargets,
}

impl DragGesture {
    /// Begin a gesture for `id`. A drag started while another is active
    /// replaces it wholesale.
    fn start(&mut self, id: String, targets: DropTargets) {
        *self = Self {
            dragged_id: Some(id),
            drag_over_id: None,
            targets,
        };
    }

    /// Record `id` as the hovered drop candidate. Hovering the dragged row
    /// itself is ignored. Returns true if anything changed.
    fn hover(&mut self, id: &str) -> bool {
        if self.dragged_id.is_none() || self.dragged_id.as_deref() == Some(id) {
            return false;
        }
        if self.drag_over_id.as_deref() == Some(id) {
            return false;
        }
        self.drag_over_id = Some(id.to_string());
        true
    }

    /// Clear the hovered candidate only; the drag itself stays active.
    fn leave(&mut self) -> bool {
        self.drag_over_id.take().is_some()
    }

    /// Reset to idle. Safe to call repeatedly and without a preceding start.
    fn end(&mut self) {
        *self = Self::default();
    }

    fn is_idle(&self) -> bool {
        self.dragged_id.is_none()
            && self.drag_over_id.is_none()
            && self.targets.valid.is_empty()
            && self.targets.invalid.is_empty()
    }

    fn is_dragging(&self, id: &str) -> bool {
        self.dragged_id.as_deref() == Some(id)
    }

    fn candidate(&self, id: &str) -> Option<DropCandidate> {
        if self.drag_over_id.as_deref() != Some(id) {
            return None;
        }
        if self.targets.valid.contains(id) {
            Some(DropCandidate::Allowed)
        } else {
            Some(DropCandidate::Denied)
        }
    }
}

/// State for the BOM tree editor widget.
pub struct BomTreeState {
    focus_handle: FocusHandle,
    items: Vec<BomNode>,
    policy: MovePolicy,
    accept_drop: Option<Rc<dyn Fn(&str, &str) -> bool>>,
    expanded: HashSet<String>,
    entries: Vec<BomTreeEntry>,
    entry_sizes: Rc<Vec<Size<Pixels>>>,
    row_height: Pixels,
    scrollbar_state: ScrollbarState,
    scroll_handle: VirtualListScrollHandle,
    selected_id: Option<String>,
    gesture: DragGesture,
    render_item:
        Rc<dyn Fn(usize, &BomTreeEntry, BomTreeRowState, &mut Window, &mut App) -> ListItem>,
}

impl EventEmitter<BomTreeEvent> for BomTreeState {}

impl BomTreeState {
    pub fn new(cx: &mut App) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            items: Vec::new(),
            policy: MovePolicy::default(),
            accept_drop: None,
            expanded: HashSet::new(),
            entries: Vec::new(),
            entry_sizes: Rc::new(Vec::new()),
            row_height: DEFAULT_ROW_HEIGHT,
            scrollbar_state: ScrollbarState::default(),
            scroll_handle: VirtualListScrollHandle::new(),
            selected_id: None,
            gesture: DragGesture::default(),
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("bom-tree-empty")),
        }
    }

    pub fn items(mut self, items: impl Into<Vec<BomNode>>) -> Self {
        self.items = items.into();
        self.rebuild_entries();
        self
    }

    /// Replace the advisory move policy (defaults to [`MovePolicy::default`]).
    pub fn policy(mut self, policy: MovePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Host veto over drop targets, on top of the structural validation.
    /// Defaults to permissive.
    pub fn accept_drop(mut self, accept: impl Fn(&str, &str) -> bool + 'static) -> Self {
        self.accept_drop = Some(Rc::new(accept));
        self
    }

    /// Uniform row height used for the virtualization window.
    pub fn row_height(mut self, height: Pixels) -> Self {
        self.row_height = height;
        self.rebuild_entries();
        self
    }

    pub fn expand(mut self, id: impl Into<String>) -> Self {
        self.expanded.insert(id.into());
        self.rebuild_entries();
        self
    }

    pub fn expand_all(mut self) -> Self {
        self.expanded = bom_core::collect_ids(&self.items).into_iter().collect();
        self.rebuild_entries();
        self
    }

    /// Replace the canonical forest, e.g. after an external reload. Any
    /// in-flight gesture is abandoned; expansion and selection survive for
    /// ids that still exist.
    pub fn set_items(&mut self, items: impl Into<Vec<BomNode>>, cx: &mut Context<Self>) {
        self.items = items.into();
        let ids: HashSet<String> = bom_core::collect_ids(&self.items).into_iter().collect();
        self.expanded.retain(|id| ids.contains(id));
        if let Some(selected) = &self.selected_id
            && !ids.contains(selected)
        {
            self.selected_id = None;
        }
        self.gesture.end();
        self.rebuild_entries();
        cx.notify();
    }

    pub fn root_items(&self) -> &[BomNode] {
        &self.items
    }

    pub fn selected_entry(&self) -> Option<&BomTreeEntry> {
        let selected = self.selected_id.as_deref()?;
        self.entries.iter().find(|entry| entry.id() == selected)
    }

    pub fn selected_node(&self) -> Option<&BomNode> {
        let selected = self.selected_id.as_deref()?;
        find_node(&self.items, selected)
    }

    /// Flip the expansion of `id` and re-flatten. Leaves are ignored. The
    /// toggled row is scrolled into view, best-effort.
    pub fn toggle_expand(&mut self, id: &str, cx: &mut Context<Self>) {
        let Some(node) = find_node(&self.items, id) else {
            return;
        };
        if !node.has_children() {
            return;
        }

        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
        self.rebuild_entries();
        if let Some(ix) = self.entries.iter().position(|entry| entry.id() == id) {
            self.scroll_handle.scroll_to_item(ix, ScrollStrategy::Center);
        }
        cx.notify();
    }

    fn rebuild_entries(&mut self) {
        let rows = flatten(&self.items, &self.expanded);
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(node) = find_node(&self.items, &row.id) else {
                continue;
            };
            entries.push(BomTreeEntry {
                node: node.clone(),
                row,
            });
        }
        self.entries = entries;
        self.entry_sizes = Rc::new(vec![size(px(0.), self.row_height); self.entries.len()]);
    }

    fn selected_ix(&self) -> Option<usize> {
        let selected = self.selected_id.as_deref()?;
        self.entries.iter().position(|entry| entry.id() == selected)
    }

    fn select_ix(&mut self, ix: usize, cx: &mut Context<Self>) {
        let ix = ix.min(self.entries.len().saturating_sub(1));
        let Some((id, node)) = self
            .entries
            .get(ix)
            .map(|entry| (entry.id().to_string(), entry.node.clone()))
        else {
            return;
        };
        self.selected_id = Some(id);
        self.scroll_handle.scroll_to_item(ix, ScrollStrategy::Center);
        cx.emit(BomTreeEvent::Selected(Some(node)));
        cx.notify();
    }

    fn on_entry_click(
        &mut self,
        ix: usize,
        _event: &gpui::ClickEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some(entry) = self.entries.get(ix) else {
            return;
        };
        let id = entry.id().to_string();
        let has_children = entry.has_children();

        self.selected_id = Some(id.clone());
        cx.emit(BomTreeEvent::Selected(
            find_node(&self.items, &id).cloned(),
        ));
        if has_children {
            self.toggle_expand(&id, cx);
        } else {
            cx.notify();
        }
    }

    fn on_drag_start(&mut self, drag: &BomTreeDrag, cx: &mut Context<Self>) {
        let source_id = drag.item_id.to_string();

        // Every node in the forest is prevalidated up front, visible or not,
        // so the hover path never walks the tree.
        let mut targets = partition_drop_targets(&source_id, &self.items, &self.policy);
        if let Some(accept) = &self.accept_drop {
            let vetoed: Vec<String> = targets
                .valid
                .iter()
                .filter(|target| !accept(&source_id, target))
                .cloned()
                .collect();
            for id in vetoed {
                targets.valid.remove(&id);
                targets.invalid.insert(id);
            }
        }

        self.gesture.start(source_id.clone(), targets);
        self.selected_id = Some(source_id);
        cx.notify();
    }

    fn on_drag_move(
        &mut self,
        event: &gpui::DragMoveEvent<BomTreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }

        // Leaving the list bounds, or a payload from some other tree, clears
        // the hover candidate without cancelling the gesture.
        let outside = !event.bounds.contains(&event.event.position);
        if (outside || event.drag(cx).tree_id != cx.entity_id()) && self.gesture.leave() {
            cx.notify();
        }
    }

    fn on_drag_move_over_row(
        &mut self,
        hovered_ix: usize,
        event: &gpui::DragMoveEvent<BomTreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        if !event.bounds.contains(&event.event.position) {
            return;
        }
        if event.drag(cx).tree_id != cx.entity_id() {
            return;
        }

        let Some(entry) = self.entries.get(hovered_ix) else {
            return;
        };
        let id = entry.id().to_string();
        if self.gesture.hover(&id) {
            cx.notify();
        }
    }

    fn on_drop_on_row(
        &mut self,
        drag: &BomTreeDrag,
        target_ix: usize,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if drag.tree_id != cx.entity_id() {
            self.end_drag(cx);
            return;
        }
        let Some(target_id) = self.entries.get(target_ix).map(|e| e.id().to_string()) else {
            self.end_drag(cx);
            return;
        };
        let source_id = drag.item_id.to_string();

        // Re-validate against the current forest; the prevalidated sets could
        // be stale if the host replaced the tree mid-drag.
        let result = validate_move(&source_id, &target_id, &self.items, &self.policy);
        let accepted = result.is_valid
            && self
                .accept_drop
                .as_ref()
                .is_none_or(|accept| accept(&source_id, &target_id));
        if !accepted {
            self.end_drag(cx);
            return;
        }

        let (items, moved) = move_node(std::mem::take(&mut self.items), &source_id, &target_id);
        self.items = items;
        if moved {
            // Keep the moved node visible.
            self.expanded.insert(target_id);
            self.selected_id = Some(source_id);
            self.rebuild_entries();
            cx.emit(BomTreeEvent::Reordered {
                items: self.items.clone(),
                warnings: result.warnings,
            });
        }
        self.end_drag(cx);
    }

    fn end_drag(&mut self, cx: &mut Context<Self>) {
        self.gesture.end();
        cx.notify();
    }

    fn on_key_down(&mut self, event: &gpui::KeyDownEvent, cx: &mut Context<Self>) -> bool {
        if cx.has_active_drag() {
            return false;
        }
        if self.entries.is_empty() {
            return false;
        }

        let mut selected_ix = self.selected_ix().unwrap_or(0).min(self.entries.len() - 1);

        match event.keystroke.key.as_str() {
            "up" => {
                if selected_ix > 0 {
                    selected_ix -= 1;
                }
                self.select_ix(selected_ix, cx);
                true
            }
            "down" => {
                if selected_ix + 1 < self.entries.len() {
                    selected_ix += 1;
                }
                self.select_ix(selected_ix, cx);
                true
            }
            "home" => {
                self.select_ix(0, cx);
                true
            }
            "end" => {
                self.select_ix(self.entries.len().saturating_sub(1), cx);
                true
            }
            "right" => {
                let Some(entry) = self.entries.get(selected_ix) else {
                    return false;
                };
                if entry.has_children() && !entry.is_expanded() {
                    let id = entry.id().to_string();
                    self.toggle_expand(&id, cx);
                    return true;
                }

                if entry.has_children() && entry.is_expanded() {
                    let child_ix = selected_ix.saturating_add(1);
                    if self
                        .entries
                        .get(child_ix)
                        .is_some_and(|child| child.depth() == entry.depth() + 1)
                    {
                        self.select_ix(child_ix, cx);
                    }
                    return true;
                }

                false
            }
            "left" => {
                let Some(entry) = self.entries.get(selected_ix) else {
                    return false;
                };

                if entry.has_children() && entry.is_expanded() {
                    let id = entry.id().to_string();
                    self.toggle_expand(&id, cx);
                    return true;
                }

                if let Some(parent_id) = entry.parent_id()
                    && let Some(parent_ix) = self
                        .entries
                        .iter()
                        .position(|entry| entry.id() == parent_id)
                {
                    self.select_ix(parent_ix, cx);
                    return true;
                }

                false
            }
            "enter" | "space" => {
                let Some(entry) = self.entries.get(selected_ix) else {
                    return false;
                };
                if !entry.has_children() {
                    return false;
                }
                let id = entry.id().to_string();
                self.toggle_expand(&id, cx);
                true
            }
            _ => false,
        }
    }
}

impl Render for BomTreeState {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        // The only reliable cleanup point: runs whether the gesture ended in a
        // drop, outside every target, or outside the window entirely.
        if !cx.has_active_drag() && !self.gesture.is_idle() {
            self.gesture.end();
        }

        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let gesture = self.gesture.clone();
        let selected_id = self.selected_id.clone();
        let entry_sizes = self.entry_sizes.clone();
        let scroll_handle = self.scroll_handle.clone();

        div()
            .id("bom-tree-state")
            .size_full()
            .relative()
            .child(
                div()
                    .id("bom-tree-list")
                    .size_full()
                    .on_drag_move::<BomTreeDrag>(cx.listener(Self::on_drag_move))
                    .on_drop::<BomTreeDrag>(cx.listener(|this, _: &BomTreeDrag, _window, cx| {
                        // Dropped on the backdrop: no target, no mutation.
                        this.end_drag(cx);
                    }))
                    .child(
                        v_virtual_list(
                            cx.entity(),
                            "entries",
                            entry_sizes,
                            move |state, visible_range: Range<usize>, window, cx| {
                                let drop_target_bg = cx.theme().drop_target;
                                let mut items = Vec::with_capacity(visible_range.len());
                                for ix in visible_range {
                                    let entry = &state.entries[ix];
                                    let selected = selected_id.as_deref() == Some(entry.id());
                                    let dragging =
                                        gesture.is_dragging(entry.id()) && cx.has_active_drag();
                                    let drop_candidate = gesture.candidate(entry.id());

                                    let row_state = BomTreeRowState {
                                        selected,
                                        dragging,
                                        drop_candidate,
                                    };

                                    let item = (render_item)(ix, entry, row_state, window, cx);
                                    let drag_value = BomTreeDrag {
                                        tree_id: cx.entity_id(),
                                        item_id: SharedString::from(entry.id().to_string()),
                                        label: SharedString::from(entry.node().name.clone()),
                                    };

                                    let state_entity = state_entity.clone();
                                    let row = div()
                                        .id(ix)
                                        .relative()
                                        .size_full()
                                        .flex()
                                        .flex_row()
                                        .when(
                                            drop_candidate == Some(DropCandidate::Allowed),
                                            |this| this.bg(drop_target_bg),
                                        )
                                        .when(
                                            drop_candidate == Some(DropCandidate::Denied),
                                            |this| this.cursor(CursorStyle::OperationNotAllowed),
                                        )
                                        .child(item.selected(selected).h_full().flex_1())
                                        .on_drag_move::<BomTreeDrag>(cx.listener(
                                            move |this, event, window, cx| {
                                                this.on_drag_move_over_row(ix, event, window, cx);
                                            },
                                        ))
                                        .on_drop::<BomTreeDrag>(cx.listener(
                                            move |this, drag, window, cx| {
                                                this.on_drop_on_row(drag, ix, window, cx);
                                            },
                                        ))
                                        .on_click(cx.listener(
                                            move |this, click_event, window, cx| {
                                                this.on_entry_click(ix, click_event, window, cx);
                                            },
                                        ))
                                        .on_drag(
                                            drag_value,
                                            move |drag, _cursor_offset, _window, cx: &mut App| {
                                                state_entity.update(cx, |state, cx| {
                                                    state.on_drag_start(drag, cx);
                                                });
                                                let label = drag.label.clone();
                                                cx.new(|_| DragGhost::new(label))
                                            },
                                        );

                                    items.push(row);
                                }
                                items
                            },
                        )
                        .track_scroll(&scroll_handle)
                        .flex_grow()
                        .size_full()
                        .with_sizing_behavior(ListSizingBehavior::Auto)
                        .into_any_element(),
                    ),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .right_0()
                    .bottom_0()
                    .w(px(12.))
                    .child(Scrollbar::uniform_scroll(
                        &self.scrollbar_state,
                        &self.scroll_handle,
                    )),
            )
    }
}

/// A drag-and-drop BOM tree editor element (virtualized, uniform row height).
#[derive(IntoElement)]
pub struct BomTree {
    id: ElementId,
    state: Entity<BomTreeState>,
    style: StyleRefinement,
    render_item:
        Rc<dyn Fn(usize, &BomTreeEntry, BomTreeRowState, &mut Window, &mut App) -> ListItem>,
}

impl BomTree {
    pub fn new<R>(state: &Entity<BomTreeState>, render_item: R) -> Self
    where
        R: Fn(usize, &BomTreeEntry, BomTreeRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("bom-tree-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(move |ix, entry, row_state, window, cx| {
                render_item(ix, entry, row_state, window, cx)
            }),
        }
    }
}

impl Styled for BomTree {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl RenderOnce for BomTree {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        let state_entity = self.state.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .on_key_down(move |event, window, cx| {
                let handled = state_entity.update(cx, |state, cx| state.on_key_down(event, cx));
                if handled {
                    window.prevent_default();
                    cx.stop_propagation();
                }
            })
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
