use super::sprites::{PixelSprite, Rgb};

pub(crate) const PALETTE: [Rgb; 15] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
    [255, 128, 0],
    [128, 0, 255],
    [0, 255, 128],
    [255, 255, 255],
    [128, 128, 128],
    [64, 64, 64],
    [0, 0, 0],
    [139, 69, 19],
    [34, 139, 34],
];

const DEFAULT_PALETTE_INDEX: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Brush {
    Color(usize),
    Eraser,
}

impl Default for Brush {
    fn default() -> Self {
        Brush::Color(DEFAULT_PALETTE_INDEX)
    }
}

#[derive(Debug)]
struct EditSession {
    sprite: PixelSprite,
    fallback_color: Option<Rgb>,
    undo: Vec<PixelSprite>,
    redo: Vec<PixelSprite>,
    stroke_start: Option<PixelSprite>,
}

/// Raster editor for one sprite at a time with stroke-granular undo.
///
/// Undo entries are whole-sprite snapshots. One stroke, from `begin_stroke`
/// to `end_stroke`, is one entry no matter how many cells it touched, and a
/// stroke that changed nothing still records one.
#[derive(Debug, Default)]
pub(crate) struct PixelCanvasEditor {
    session: Option<EditSession>,
    brush: Brush,
}

impl PixelCanvasEditor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin_editing(&mut self, sprite: PixelSprite, fallback_color: Option<Rgb>) {
        self.session = Some(EditSession {
            sprite,
            fallback_color,
            undo: Vec::new(),
            redo: Vec::new(),
            stroke_start: None,
        });
    }

    /// Ends the session and hands back the edited sprite. A stroke still in
    /// progress is dropped without an undo entry; its cells stay painted.
    pub(crate) fn finish_editing(&mut self) -> Option<PixelSprite> {
        self.session.take().map(|session| session.sprite)
    }

    #[cfg(test)]
    pub(crate) fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn sprite(&self) -> Option<&PixelSprite> {
        self.session.as_ref().map(|session| &session.sprite)
    }

    pub(crate) fn brush(&self) -> Brush {
        self.brush
    }

    pub(crate) fn select_color(&mut self, index: usize) -> bool {
        if index >= PALETTE.len() {
            return false;
        }
        self.brush = Brush::Color(index);
        true
    }

    pub(crate) fn select_eraser(&mut self) {
        self.brush = Brush::Eraser;
    }

    fn active_color(&self) -> Option<Rgb> {
        match self.brush {
            Brush::Color(index) => PALETTE.get(index).copied(),
            Brush::Eraser => None,
        }
    }

    /// Writes the brush into one cell. Out-of-range cells and calls with no
    /// open session do nothing and return `false`.
    pub(crate) fn paint(&mut self, grid_x: i32, grid_y: i32) -> bool {
        let color = self.active_color();
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if grid_x < 0 || grid_y < 0 {
            return false;
        }
        session
            .sprite
            .set_pixel(grid_x as usize, grid_y as usize, color)
    }

    pub(crate) fn begin_stroke(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.stroke_start.is_none() {
                session.stroke_start = Some(session.sprite.clone());
            }
        }
    }

    pub(crate) fn stroke_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.stroke_start.is_some())
    }

    /// Commits the open stroke as one undo entry. Returns `false` when no
    /// stroke was open.
    pub(crate) fn end_stroke(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(before) = session.stroke_start.take() else {
            return false;
        };
        session.undo.push(before);
        session.redo.clear();
        true
    }

    pub(crate) fn undo(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(previous) = session.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut session.sprite, previous);
        session.redo.push(current);
        true
    }

    pub(crate) fn redo(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(next) = session.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut session.sprite, next);
        session.undo.push(current);
        true
    }

    /// Fills the whole sprite with the kind's default color as one undoable
    /// step. Fails when the session has no default color.
    pub(crate) fn reset_to_default(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(color) = session.fallback_color else {
            return false;
        };
        session.undo.push(session.sprite.clone());
        session.redo.clear();
        session.sprite.fill(color);
        true
    }

    #[cfg(test)]
    pub(crate) fn history_depth(&self) -> (usize, usize) {
        self.session
            .as_ref()
            .map_or((0, 0), |session| (session.undo.len(), session.redo.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb = [255, 255, 255];
    const GREEN: Rgb = [34, 139, 34];

    fn editing(sprite: PixelSprite) -> PixelCanvasEditor {
        let mut editor = PixelCanvasEditor::new();
        editor.begin_editing(sprite, Some(GREEN));
        editor
    }

    fn stroke(editor: &mut PixelCanvasEditor, cells: &[(i32, i32)]) {
        editor.begin_stroke();
        for &(x, y) in cells {
            editor.paint(x, y);
        }
        editor.end_stroke();
    }

    fn sprite(editor: &PixelCanvasEditor) -> PixelSprite {
        editor.sprite().expect("editing").clone()
    }

    #[test]
    fn default_brush_is_white() {
        let mut editor = editing(PixelSprite::transparent(4, 4));
        assert_eq!(editor.brush(), Brush::Color(9));
        assert!(editor.paint(1, 1));
        assert_eq!(sprite(&editor).pixel(1, 1), Some(WHITE));
    }

    #[test]
    fn paint_outside_grid_is_a_no_op() {
        let mut editor = editing(PixelSprite::transparent(4, 4));
        let before = sprite(&editor);
        assert!(!editor.paint(-1, 0));
        assert!(!editor.paint(4, 0));
        assert!(!editor.paint(0, 32));
        assert_eq!(sprite(&editor), before);
    }

    #[test]
    fn eraser_clears_cells() {
        let mut editor = editing(PixelSprite::filled(2, 2, GREEN));
        editor.select_eraser();
        editor.paint(0, 1);
        assert_eq!(sprite(&editor).pixel(0, 1), None);
        assert_eq!(sprite(&editor).pixel(1, 1), Some(GREEN));
    }

    #[test]
    fn palette_selection_rejects_unknown_index() {
        let mut editor = PixelCanvasEditor::new();
        assert!(editor.select_color(0));
        assert!(!editor.select_color(PALETTE.len()));
        assert_eq!(editor.brush(), Brush::Color(0));
    }

    #[test]
    fn undoing_every_stroke_restores_original() {
        let original = PixelSprite::transparent(8, 8);
        let mut editor = editing(original.clone());

        stroke(&mut editor, &[(0, 0), (1, 0), (2, 0)]);
        editor.select_color(0);
        stroke(&mut editor, &[(3, 3)]);
        editor.select_eraser();
        stroke(&mut editor, &[(1, 0)]);
        let edited = sprite(&editor);
        assert_eq!(editor.history_depth(), (3, 0));

        for _ in 0..3 {
            assert!(editor.undo());
        }
        assert!(!editor.undo());
        assert_eq!(sprite(&editor), original);

        for _ in 0..3 {
            assert!(editor.redo());
        }
        assert!(!editor.redo());
        assert_eq!(sprite(&editor), edited);
    }

    #[test]
    fn one_stroke_is_one_undo_unit() {
        let mut editor = editing(PixelSprite::transparent(8, 8));
        stroke(&mut editor, &[(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert!(editor.undo());
        assert_eq!(sprite(&editor).painted_count(), 0);
    }

    #[test]
    fn new_stroke_after_undo_clears_redo() {
        let mut editor = editing(PixelSprite::transparent(4, 4));
        stroke(&mut editor, &[(0, 0)]);
        assert!(editor.undo());
        stroke(&mut editor, &[(1, 1)]);
        assert!(!editor.redo());
    }

    #[test]
    fn zero_change_stroke_still_records_entry() {
        let mut editor = editing(PixelSprite::filled(2, 2, WHITE));
        stroke(&mut editor, &[(0, 0)]);
        assert_eq!(editor.history_depth(), (1, 0));
    }

    #[test]
    fn end_stroke_without_begin_records_nothing() {
        let mut editor = editing(PixelSprite::transparent(2, 2));
        editor.paint(0, 0);
        assert!(!editor.end_stroke());
        assert_eq!(editor.history_depth(), (0, 0));
    }

    #[test]
    fn reset_fills_with_default_and_is_undoable() {
        let mut editor = editing(PixelSprite::transparent(3, 3));
        stroke(&mut editor, &[(1, 1)]);
        stroke(&mut editor, &[(2, 2)]);
        assert!(editor.undo());
        let before_reset = sprite(&editor);

        assert!(editor.reset_to_default());
        assert_eq!(sprite(&editor), PixelSprite::filled(3, 3, GREEN));
        assert!(!editor.redo());

        assert!(editor.undo());
        assert_eq!(sprite(&editor), before_reset);
    }

    #[test]
    fn reset_without_default_color_fails() {
        let mut editor = PixelCanvasEditor::new();
        editor.begin_editing(PixelSprite::transparent(2, 2), None);
        assert!(!editor.reset_to_default());
        assert_eq!(editor.history_depth(), (0, 0));
    }

    #[test]
    fn begin_editing_resets_history() {
        let mut editor = editing(PixelSprite::transparent(2, 2));
        stroke(&mut editor, &[(0, 0)]);
        editor.begin_editing(PixelSprite::transparent(2, 2), Some(GREEN));
        assert!(!editor.undo());
    }

    #[test]
    fn finish_mid_stroke_keeps_pixels_without_history() {
        let mut editor = editing(PixelSprite::transparent(2, 2));
        editor.begin_stroke();
        editor.paint(1, 0);
        assert!(editor.stroke_active());

        let finished = editor.finish_editing().expect("sprite");
        assert_eq!(finished.pixel(1, 0), Some(WHITE));
        assert!(!editor.is_editing());
        assert!(!editor.undo());
    }
}
