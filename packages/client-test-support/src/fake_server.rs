//! In-process fake game server for integration tests.
//!
//! Serves the same routes as the real server (`/`, `/new`, `/game/{id}`)
//! with the same status codes and error documents, but plays a scripted
//! sequence of rounds instead of a real game. A round advances once every
//! active player has a valid action recorded; the game ends after the last
//! round. Failures can be injected per operation.
//!
//! Must be started from inside an actix system, e.g. `#[actix_web::test]`.

use std::collections::{BTreeMap, HashMap};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

const WINDS: [&str; 4] = ["East", "South", "West", "North"];

/// One scripted round: who must act and what each of them may choose.
#[derive(Debug, Clone)]
pub struct ScriptedRound {
    pub state_name: String,
    pub active_players: Vec<u32>,
    pub actions: Vec<(u32, String)>,
}

impl ScriptedRound {
    pub fn new(state_name: &str, active_players: &[u32], actions: &[(u32, &str)]) -> Self {
        Self {
            state_name: state_name.to_string(),
            active_players: active_players.to_vec(),
            actions: actions
                .iter()
                .map(|(id, text)| (*id, text.to_string()))
                .collect(),
        }
    }
}

/// Script and failure injection for a fake server.
#[derive(Debug, Clone)]
pub struct FakeServerOptions {
    pub players: Vec<u32>,
    pub rounds: Vec<ScriptedRound>,
    pub final_state_name: String,
    /// Status returned by `/new`; anything outside 2xx returns an error document
    pub create_status: u16,
    /// Reply to every state fetch with this status and an error document
    pub state_failure: Option<u16>,
    /// Reply to every state fetch with a truncated JSON body
    pub malformed_state: bool,
    /// Reply to every submission with this status and an error document
    pub submit_failure: Option<u16>,
}

impl Default for FakeServerOptions {
    fn default() -> Self {
        Self {
            players: vec![1, 2, 3, 4],
            rounds: Vec::new(),
            final_state_name: "game over".to_string(),
            create_status: 201,
            state_failure: None,
            malformed_state: false,
            submit_failure: None,
        }
    }
}

impl FakeServerOptions {
    /// Two players, three rounds, ending in "showdown".
    ///
    /// The first round is `preflop` with players 1 and 2 each offered
    /// `{"0": "check"}`.
    pub fn heads_up() -> Self {
        Self {
            players: vec![1, 2],
            rounds: vec![
                ScriptedRound::new("preflop", &[1, 2], &[(0, "check")]),
                ScriptedRound::new("flop", &[1, 2], &[(0, "check"), (1, "bet")]),
                ScriptedRound::new("river", &[2], &[(0, "fold"), (1, "call"), (2, "raise")]),
            ],
            final_state_name: "showdown".to_string(),
            ..Self::default()
        }
    }

    pub fn with_rounds(mut self, rounds: Vec<ScriptedRound>) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_create_status(mut self, status: u16) -> Self {
        self.create_status = status;
        self
    }

    pub fn with_state_failure(mut self, status: u16) -> Self {
        self.state_failure = Some(status);
        self
    }

    pub fn with_malformed_state(mut self) -> Self {
        self.malformed_state = true;
        self
    }

    pub fn with_submit_failure(mut self, status: u16) -> Self {
        self.submit_failure = Some(status);
        self
    }
}

/// A submission as the server received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub game_id: u64,
    pub form: BTreeMap<String, String>,
    /// Status the server answered with
    pub status: u16,
}

#[derive(Debug, Default)]
struct FakeGame {
    round: usize,
    pending: BTreeMap<u32, u32>,
}

struct Shared {
    options: FakeServerOptions,
    games: BTreeMap<u64, FakeGame>,
    last_id: u64,
    submissions: Vec<RecordedSubmission>,
    state_fetches: usize,
    base_url: String,
}

impl Shared {
    fn has_ended(&self, game: &FakeGame) -> bool {
        game.round >= self.options.rounds.len()
    }

    fn view(&self, id: u64, game: &FakeGame) -> Value {
        let current = self.options.rounds.get(game.round);
        let active: Vec<u32> = current.map(|r| r.active_players.clone()).unwrap_or_default();

        let mut players = Map::new();
        for (seat, player) in self.options.players.iter().enumerate() {
            let mut actions = Map::new();
            if let Some(round) = current {
                if active.contains(player) {
                    for (action, text) in &round.actions {
                        actions.insert(action.to_string(), Value::String(text.clone()));
                    }
                }
            }
            players.insert(
                player.to_string(),
                json!({
                    "actions": actions,
                    "wind": WINDS[seat % WINDS.len()],
                    "score": 0,
                    "received": "none",
                    "concealed": [],
                    "exposed": [],
                    "discarded": [],
                }),
            );
        }

        let state_name = current
            .map(|r| r.state_name.clone())
            .unwrap_or_else(|| self.options.final_state_name.clone());
        // The real server sends null when nobody has to act.
        let active_players = if active.is_empty() {
            Value::Null
        } else {
            json!(active)
        };

        json!({
            "id": id,
            "has_ended": current.is_none(),
            "state_name": state_name,
            "prevalent_wind": "East",
            "active_players": active_players,
            "active_discard": "none",
            "players": players,
            "wall": [],
        })
    }

    /// Validate a whole form, then apply it. Returns an error message for the
    /// first bad entry without applying anything.
    fn apply(&mut self, id: u64, form: &HashMap<String, String>) -> Result<(), String> {
        let game = self
            .games
            .get(&id)
            .ok_or_else(|| format!("no game with id [{id}]"))?;
        if self.has_ended(game) {
            return Err(format!("game {id} has ended"));
        }
        let round = &self.options.rounds[game.round];

        let mut accepted = Vec::new();
        for (key, value) in form {
            let player: u32 = key
                .parse()
                .map_err(|_| format!("invalid player key [{key}]"))?;
            let action: u32 = value
                .parse()
                .map_err(|_| format!("invalid action [{value}] for player {player}"))?;
            if !round.active_players.contains(&player) {
                continue;
            }
            if !round.actions.iter().any(|(a, _)| *a == action) {
                return Err(format!("incorrect action {action} for player {player}"));
            }
            accepted.push((player, action));
        }

        let rounds = self.options.rounds.len();
        let game = self
            .games
            .get_mut(&id)
            .ok_or_else(|| format!("no game with id [{id}]"))?;
        game.pending.extend(accepted);
        if round_complete(&self.options.rounds[game.round], &game.pending) {
            game.round = (game.round + 1).min(rounds);
            game.pending.clear();
        }
        Ok(())
    }
}

fn round_complete(round: &ScriptedRound, pending: &BTreeMap<u32, u32>) -> bool {
    round
        .active_players
        .iter()
        .all(|player| pending.contains_key(player))
}

type SharedState = web::Data<Mutex<Shared>>;

fn error_document(status: u16, message: &str) -> HttpResponse {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(code).json(json!({
        "error": message,
        "status_code": status,
    }))
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

async fn index(shared: SharedState) -> HttpResponse {
    let shared = shared.lock();
    HttpResponse::Ok().json(json!({
        "message": "Fake Game API",
        "version": "0.1",
        "games_started": shared.last_id,
        "new_game": format!("{}/new", shared.base_url),
    }))
}

async fn new_game(shared: SharedState) -> HttpResponse {
    let mut shared = shared.lock();
    let status = shared.options.create_status;
    if !is_success(status) {
        return error_document(status, "unable to start game");
    }

    shared.last_id += 1;
    let id = shared.last_id;
    shared.games.insert(id, FakeGame::default());

    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::CREATED);
    HttpResponse::build(code).json(json!({
        "message": "Game created",
        "id": id,
        "location": format!("{}/game/{}", shared.base_url, id),
    }))
}

async fn show_game(shared: SharedState, path: web::Path<u64>) -> HttpResponse {
    let id = path.into_inner();
    let mut shared = shared.lock();
    shared.state_fetches += 1;

    if let Some(status) = shared.options.state_failure {
        return error_document(status, "state unavailable");
    }
    if shared.options.malformed_state {
        return HttpResponse::Ok()
            .content_type("application/json")
            .body(r#"{"state_name": "preflop", "players": "#);
    }

    match shared.games.get(&id) {
        Some(game) => HttpResponse::Ok().json(shared.view(id, game)),
        None => error_document(404, &format!("no game with id [{id}]")),
    }
}

async fn submit_actions(
    shared: SharedState,
    path: web::Path<u64>,
    form: web::Form<HashMap<String, String>>,
) -> HttpResponse {
    let id = path.into_inner();
    let form = form.into_inner();
    let mut shared = shared.lock();

    let (status, response) = if let Some(status) = shared.options.submit_failure {
        (status, error_document(status, "actions not accepted"))
    } else if !shared.games.contains_key(&id) {
        (404, error_document(404, &format!("no game with id [{id}]")))
    } else {
        match shared.apply(id, &form) {
            Ok(()) => {
                let location = format!("{}/game/{}", shared.base_url, id);
                (
                    202,
                    HttpResponse::Accepted().json(json!({
                        "message": "actions executed",
                        "location": location,
                    })),
                )
            }
            Err(message) => (400, error_document(400, &message)),
        }
    };

    shared.submissions.push(RecordedSubmission {
        game_id: id,
        form: form.into_iter().collect(),
        status,
    });
    response
}

/// Handle to a running fake server.
pub struct FakeServer {
    addr: SocketAddr,
    shared: Arc<Mutex<Shared>>,
    handle: ServerHandle,
}

impl FakeServer {
    /// Bind to an ephemeral loopback port and start serving.
    pub fn start(options: FakeServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;

        let shared = Arc::new(Mutex::new(Shared {
            options,
            games: BTreeMap::new(),
            last_id: 0,
            submissions: Vec::new(),
            state_fetches: 0,
            base_url: format!("http://{addr}"),
        }));
        let data: SharedState = web::Data::from(shared.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/", web::get().to(index))
                .route("/new", web::route().to(new_game))
                .route("/game/{id}", web::get().to(show_game))
                .route("/game/{id}", web::post().to(submit_actions))
        })
        .workers(1)
        .disable_signals()
        .listen(listener)?
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Ok(Self {
            addr,
            shared,
            handle,
        })
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `127.0.0.1:<port>`, without a scheme.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.shared.lock().submissions.clone()
    }

    pub fn state_fetches(&self) -> usize {
        self.shared.lock().state_fetches
    }

    pub fn games_created(&self) -> u64 {
        self.shared.lock().last_id
    }

    /// Index of the current round of game `id`, if it exists.
    pub fn round_of(&self, id: u64) -> Option<usize> {
        self.shared.lock().games.get(&id).map(|g| g.round)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
