use macroquad::prelude::*;
use shared::{Player, PlayerId, PlayerMap, BASE_Y, PLAYER_HEIGHT, PLAYER_WIDTH};

const SCOREBOARD_X: f32 = 10.0;
const SCOREBOARD_Y: f32 = 20.0;
const SCOREBOARD_LINE: f32 = 18.0;

/// One scoreboard row: label and whether it belongs to the local player.
pub fn scoreboard_lines(players: &PlayerMap, local_id: Option<&PlayerId>) -> Vec<(String, bool)> {
    players
        .values()
        .map(|player| {
            (
                format!("Player {}: {}", player.id.short(), player.score),
                Some(&player.id) == local_id,
            )
        })
        .collect()
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Renderer { width, height }
    }

    pub fn render(&mut self, players: &PlayerMap, local_id: Option<&PlayerId>) {
        clear_background(WHITE);

        self.draw_ground();

        for player in players.values() {
            let is_local_player = Some(&player.id) == local_id;
            self.draw_player(player, if is_local_player { BLUE } else { RED });
        }

        self.draw_scoreboard(players, local_id);
    }

    fn draw_ground(&mut self) {
        let ground_y = BASE_Y + PLAYER_HEIGHT;
        draw_line(0.0, ground_y, self.width, ground_y, 1.0, BLACK);
        draw_rectangle_lines(0.0, 0.0, self.width, self.height, 1.0, BLACK);
    }

    fn draw_player(&mut self, player: &Player, color: Color) {
        draw_rectangle(player.x, player.y, PLAYER_WIDTH, player.height(), color);
    }

    fn draw_scoreboard(&mut self, players: &PlayerMap, local_id: Option<&PlayerId>) {
        for (i, (line, is_local)) in scoreboard_lines(players, local_id).iter().enumerate() {
            let color = if *is_local { BLUE } else { RED };
            let y = SCOREBOARD_Y + i as f32 * SCOREBOARD_LINE;
            draw_text(line, SCOREBOARD_X, y, 18.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_marks_local_player() {
        let mut players = PlayerMap::new();
        let local = PlayerId::new("abcdefgh");
        let mut remote = Player::new(PlayerId::new("zyxwvut"));
        remote.score = 12;
        players.insert(local.clone(), Player::new(local.clone()));
        players.insert(remote.id.clone(), remote);

        let lines = scoreboard_lines(&players, Some(&local));

        assert_eq!(
            lines,
            vec![
                ("Player abcde: 0".to_string(), true),
                ("Player zyxwv: 12".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_scoreboard_without_identity() {
        let mut players = PlayerMap::new();
        players.insert(PlayerId::new("A"), Player::new(PlayerId::new("A")));

        assert_eq!(
            scoreboard_lines(&players, None),
            vec![("Player A: 0".to_string(), false)]
        );
    }
}
