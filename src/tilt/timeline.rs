use shakmaty::Color;

use super::config::ClockDelta;
use crate::annotation::Annotation;
use crate::game::{Game, MoveId, MoveNode};

/// Flip a White-relative evaluation to `player`'s point of view.
pub fn player_relative(eval: i32, player: Color) -> i32 {
    match player {
        Color::White => eval,
        Color::Black => -eval,
    }
}

/// A game's mainline with every ply's annotation parsed once up front.
pub struct Timeline<'g> {
    game: &'g Game,
    annotations: Vec<Annotation>,
}

impl<'g> Timeline<'g> {
    pub fn new(game: &'g Game) -> Self {
        let annotations = game
            .mainline()
            .map(|node| Annotation::parse(node.comment()))
            .collect();
        Self { game, annotations }
    }

    pub fn node(&self, id: MoveId) -> Option<&'g MoveNode> {
        self.game.node(id)
    }

    pub fn next(&self, id: MoveId) -> Option<MoveId> {
        self.node(id).and_then(MoveNode::next)
    }

    pub fn annotation(&self, id: MoveId) -> Annotation {
        self.annotations.get(id).copied().unwrap_or_default()
    }

    pub fn eval(&self, id: MoveId) -> Option<i32> {
        self.annotation(id).eval
    }

    pub fn clock(&self, id: MoveId) -> Option<u32> {
        self.annotation(id).clock
    }

    /// Seconds spent on ply `id`: the earlier clock reading selected by
    /// `delta` minus this ply's reading. `None` unless both readings exist.
    pub fn time_spent(&self, id: MoveId, delta: ClockDelta) -> Option<i64> {
        let parent = self.node(id)?.parent()?;
        let earlier = match delta {
            ClockDelta::PreviousPly => parent,
            ClockDelta::SameSide => self.node(parent)?.parent()?,
        };
        Some(i64::from(self.clock(earlier)?) - i64::from(self.clock(id)?))
    }
}
