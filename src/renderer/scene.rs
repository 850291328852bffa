//! Scene drawing: road, entities and overlays

use glam::Vec2;

use super::{Surface, palette};
use crate::consts::LANE_MARGIN;
use crate::settings::Settings;
use crate::sim::{Body, Collectible, Entity, GamePhase, GameState, Obstacle, Player};

/// Dash length and gap of the scrolling lane markings
const DASH: f32 = 20.0;
const DASH_PERIOD: f32 = DASH * 2.0;
const GLYPH_PX: f32 = 60.0;

/// Visual toggles resolved from [`Settings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneOptions {
    pub road_markings: bool,
    pub hurt_flash: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SceneOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            road_markings: settings.effective_road_markings(),
            hurt_flash: settings.effective_hurt_flash(),
        }
    }
}

/// Paint one frame of `state` at timestamp `now` (ms)
///
/// `now` only drives the hurt flash. Lane markings follow the run's own
/// scroll clock, so they hold still whenever play does.
pub fn draw_frame(
    surface: &mut impl Surface,
    state: &GameState,
    now: f64,
    options: SceneOptions,
) {
    draw_road(surface, state, options);

    for entity in state.entities() {
        match entity {
            Entity::Player(player) => draw_player(surface, player, now, options),
            Entity::Obstacle(obstacle) => draw_obstacle(surface, obstacle),
            Entity::Collectible(collectible) => draw_collectible(surface, collectible),
        }
    }

    if state.phase == GamePhase::Paused {
        draw_paused(surface);
    }
}

fn draw_road(surface: &mut impl Surface, state: &GameState, options: SceneOptions) {
    let width = surface.width();
    let height = surface.height();
    let lane_width = state.arena.lane_width();

    surface.clear(palette::ROAD);

    // Lane dividers
    for x in [lane_width, lane_width * 2.0] {
        surface.line(Vec2::new(x, 0.0), Vec2::new(x, height), palette::LANE_LINE, 3.0, None);
    }

    // Road edges
    for x in [LANE_MARGIN, width - LANE_MARGIN] {
        surface.line(Vec2::new(x, 0.0), Vec2::new(x, height), palette::ROAD_EDGE, 2.0, None);
    }

    if !options.road_markings {
        return;
    }

    // 1px every 10ms of play
    let offset = ((state.road_scroll_ms / 10.0) % DASH_PERIOD as f64) as f32;
    let mut y = -offset;
    while y < height {
        for x in [lane_width, lane_width * 2.0] {
            surface.line(
                Vec2::new(x, y),
                Vec2::new(x, y + DASH),
                palette::LANE_LINE,
                2.0,
                Some((DASH, DASH)),
            );
        }
        y += DASH_PERIOD;
    }
}

fn draw_player(surface: &mut impl Surface, player: &Player, now: f64, options: SceneOptions) {
    let radius = player.size / 2.0;
    let center = player.bounds().center();
    let color = if options.hurt_flash && player.is_hurt(now) {
        palette::PLAYER_HURT
    } else {
        palette::PLAYER
    };
    surface.fill_circle(center, radius, color);

    // Heading arrow
    let tip = Vec2::new(center.x, player.pos.y + 10.0);
    surface.fill_triangle(
        [
            tip,
            Vec2::new(center.x - 10.0, player.pos.y + 25.0),
            Vec2::new(center.x + 10.0, player.pos.y + 25.0),
        ],
        palette::ARROW,
    );
}

fn draw_obstacle(surface: &mut impl Surface, obstacle: &Obstacle) {
    let size = Vec2::splat(obstacle.size);
    if obstacle.is_hit() {
        surface.set_alpha(0.5);
    }
    surface.fill_rect(obstacle.pos, size, palette::OBSTACLE);
    surface.stroke_rect(obstacle.pos, size, palette::OBSTACLE_BORDER, 2.0);
    if obstacle.is_hit() {
        surface.set_alpha(1.0);
    }
}

fn draw_collectible(surface: &mut impl Surface, collectible: &Collectible) {
    if collectible.collected {
        return;
    }
    let center = collectible.bounds().center();
    let radius = collectible.size / 2.0;
    surface.fill_circle(center, radius, palette::COLLECTIBLE);
    surface.stroke_circle(center, radius, palette::COLLECTIBLE_BORDER, 2.0);
    surface.text(&collectible.glyph, center, GLYPH_PX, palette::GLYPH);
}

fn draw_paused(surface: &mut impl Surface) {
    let size = Vec2::new(surface.width(), surface.height());
    surface.fill_rect(Vec2::ZERO, size, palette::OVERLAY.with_alpha(0.5));
    surface.text("PAUSED", size / 2.0, 48.0, palette::OVERLAY_TEXT);
}
