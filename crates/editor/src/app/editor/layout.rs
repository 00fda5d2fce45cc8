use engine::Rect;

use super::items::ItemKind;

pub(crate) const TOOLBAR_HEIGHT: i32 = 50;
pub(crate) const ITEM_PANEL_WIDTH: i32 = 200;
pub(crate) const ITEM_ROW_HEIGHT: i32 = 60;
pub(crate) const ITEM_SWATCH_SIZE: i32 = 40;
const PANEL_MARGIN: i32 = 10;
const DROP_BUTTON_HEIGHT: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToolbarButton {
    Play,
    Save,
    Load,
    Design,
}

impl ToolbarButton {
    pub(crate) const ALL: [ToolbarButton; 4] = [
        ToolbarButton::Play,
        ToolbarButton::Save,
        ToolbarButton::Load,
        ToolbarButton::Design,
    ];

    /// Buttons are 100x30 and laid out left to right with 10 px gaps.
    pub(crate) fn rect(self) -> Rect {
        let slot = match self {
            ToolbarButton::Play => 0,
            ToolbarButton::Save => 1,
            ToolbarButton::Load => 2,
            ToolbarButton::Design => 3,
        };
        Rect::new(10 + slot * 110, 10, 100, 30)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PanelHit {
    DropButton,
    Item(ItemKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Toolbar,
    ItemPanel,
    View,
}

/// Fixed three-region window split: toolbar across the top, item panel down
/// the left, map view (or pixel editor) filling the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScreenLayout {
    pub(crate) screen: Rect,
    pub(crate) toolbar: Rect,
    pub(crate) item_panel: Rect,
    pub(crate) view: Rect,
}

impl ScreenLayout {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as i32, height as i32);
        let body_height = (height - TOOLBAR_HEIGHT).max(0);
        Self {
            screen: Rect::new(0, 0, width, height),
            toolbar: Rect::new(0, 0, width, TOOLBAR_HEIGHT),
            item_panel: Rect::new(0, TOOLBAR_HEIGHT, ITEM_PANEL_WIDTH, body_height),
            view: Rect::new(
                ITEM_PANEL_WIDTH,
                TOOLBAR_HEIGHT,
                (width - ITEM_PANEL_WIDTH).max(0),
                body_height,
            ),
        }
    }

    /// Toolbar first, then the item panel, then the view.
    pub(crate) fn region_at(&self, point: (i32, i32)) -> Option<Region> {
        if self.toolbar.contains(point) {
            Some(Region::Toolbar)
        } else if self.item_panel.contains(point) {
            Some(Region::ItemPanel)
        } else if self.view.contains(point) {
            Some(Region::View)
        } else {
            None
        }
    }

    pub(crate) fn toolbar_button_at(&self, point: (i32, i32)) -> Option<ToolbarButton> {
        ToolbarButton::ALL
            .into_iter()
            .find(|button| button.rect().contains(point))
    }

    pub(crate) fn drop_button(&self) -> Rect {
        Rect::new(
            PANEL_MARGIN,
            self.item_panel.y + PANEL_MARGIN,
            self.item_panel.w - PANEL_MARGIN * 2,
            DROP_BUTTON_HEIGHT,
        )
    }

    fn item_list_top(&self) -> i32 {
        self.drop_button().bottom() + PANEL_MARGIN
    }

    pub(crate) fn item_row(&self, index: usize) -> Rect {
        Rect::new(
            self.item_panel.x,
            self.item_list_top() + index as i32 * ITEM_ROW_HEIGHT,
            self.item_panel.w,
            ITEM_ROW_HEIGHT,
        )
    }

    pub(crate) fn item_swatch(&self, index: usize) -> Rect {
        let row = self.item_row(index);
        Rect::new(PANEL_MARGIN, row.y, ITEM_SWATCH_SIZE, ITEM_SWATCH_SIZE)
    }

    pub(crate) fn panel_hit(&self, point: (i32, i32)) -> Option<PanelHit> {
        if !self.item_panel.contains(point) {
            return None;
        }
        let drop = self.drop_button();
        if (drop.y..drop.bottom()).contains(&point.1) {
            return Some(PanelHit::DropButton);
        }
        ItemKind::ALL
            .into_iter()
            .enumerate()
            .find(|(index, _)| self.item_row(*index).contains(point))
            .map(|(_, kind)| PanelHit::Item(kind))
    }
}
