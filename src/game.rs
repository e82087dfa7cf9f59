//! Mainline move history stored as an arena of plies.

use shakmaty::Color;

use crate::types::GameHeaders;

/// Index of a ply inside [`Game`]'s arena.
pub type MoveId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNode {
    ply: u32,
    san: String,
    comment: Option<String>,
    parent: Option<MoveId>,
    next: Option<MoveId>,
}

impl MoveNode {
    /// 1-based half-move index; White plays the odd plies.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Side making this move.
    pub fn turn(&self) -> Color {
        if self.ply % 2 == 1 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Full-move number as printed in movetext (`12.` for plies 23 and 24).
    pub fn move_number(&self) -> u32 {
        self.ply.div_ceil(2)
    }

    pub fn san(&self) -> &str {
        &self.san
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Previous ply, `None` for the first move.
    pub fn parent(&self) -> Option<MoveId> {
        self.parent
    }

    pub fn next(&self) -> Option<MoveId> {
        self.next
    }
}

/// One game: headers plus its mainline. Variations are not kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    headers: GameHeaders,
    nodes: Vec<MoveNode>,
}

impl Game {
    pub fn new(headers: GameHeaders) -> Self {
        Self {
            headers,
            nodes: Vec::new(),
        }
    }

    pub fn headers(&self) -> &GameHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut GameHeaders {
        &mut self.headers
    }

    /// Append the next mainline ply and return its id.
    pub fn push_move(&mut self, san: impl Into<String>, comment: Option<String>) -> MoveId {
        let id = self.nodes.len();
        let parent = id.checked_sub(1);
        if let Some(parent) = parent {
            self.nodes[parent].next = Some(id);
        }

        self.nodes.push(MoveNode {
            ply: (id + 1) as u32,
            san: san.into(),
            comment: comment.filter(|c| !c.is_empty()),
            parent,
            next: None,
        });
        id
    }

    /// Attach comment text to a ply, joining with any comment already there.
    pub fn append_comment(&mut self, id: MoveId, text: &str) {
        let text = text.trim();
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if text.is_empty() {
            return;
        }

        match &mut node.comment {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => node.comment = Some(text.to_string()),
        }
    }

    pub fn last(&self) -> Option<MoveId> {
        self.nodes.len().checked_sub(1)
    }

    pub fn node(&self, id: MoveId) -> Option<&MoveNode> {
        self.nodes.get(id)
    }

    pub fn mainline(&self) -> impl Iterator<Item = &MoveNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Synthetic annotated games for engine tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::Game;
    use crate::types::GameHeaders;

    /// Eval (centipawns, White's view) and clock (seconds) for one ply.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PlySpec {
        pub eval: Option<i32>,
        pub clock: Option<u32>,
    }

    pub fn ply(eval: i32, clock: u32) -> PlySpec {
        PlySpec {
            eval: Some(eval),
            clock: Some(clock),
        }
    }

    pub fn format_eval(cp: i32) -> String {
        let sign = if cp < 0 { "-" } else { "" };
        let abs = cp.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }

    pub fn format_clock(seconds: u32) -> String {
        format!("{}:{:02}:{:02}", seconds / 3600, (seconds / 60) % 60, seconds % 60)
    }

    pub fn build_game(plies: &[PlySpec]) -> Game {
        let mut game = Game::new(GameHeaders::default());
        for (i, spec) in plies.iter().enumerate() {
            let mut parts = Vec::new();
            if let Some(eval) = spec.eval {
                parts.push(format!("[%eval {}]", format_eval(eval)));
            }
            if let Some(clock) = spec.clock {
                parts.push(format!("[%clk {}]", format_clock(clock)));
            }
            let comment = (!parts.is_empty()).then(|| parts.join(" "));
            game.push_move(format!("m{}", i + 1), comment);
        }
        game
    }

    /// Quiet game: both sides spend 10s per move and the eval sits at `eval`.
    /// White's clock after move k is `start - 10k`, Black's the same.
    pub fn steady_plies(count: usize, eval: i32, start: u32) -> Vec<PlySpec> {
        (1..=count as u32)
            .map(|ply| ply_at(ply, eval, start))
            .collect()
    }

    pub fn clock_at(ply: u32, start: u32) -> u32 {
        start - 10 * ply.div_ceil(2)
    }

    pub fn ply_at(ply: u32, eval: i32, start: u32) -> PlySpec {
        self::ply(eval, clock_at(ply, start))
    }
}
