//! Command-line front end
//!
//! Every subcommand opens the matching view model, runs it once, and prints
//! the result. Seat numbers on the command line are 1-based.

use std::path::PathBuf;

use clap::Subcommand;
use cinema_core::{
    Credentials, Error, ReservationId, Result, ScreeningId, SeatState, SeatView, SessionProvider,
};

use crate::flow::FlowScope;
use crate::state::AppState;
use crate::viewmodel::{
    AuthView, MoviesView, ReservationEditFlow, ReservationFlow, ReservationsView, Route,
    ScreeningsView, LOGIN_SUCCESS, REGISTER_SUCCESS, RESERVATION_SUCCESS, UPDATE_SUCCESS,
};

const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const SEATS_PER_ROW: usize = 10;

#[derive(Subcommand)]
pub enum Command {
    /// List the movie catalogue
    Movies,
    /// List screenings with free seat counts
    Screenings,
    /// Show the seat map of a screening
    Seats { screening: i64 },
    /// Log in and remember the session
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        username: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the cached session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Book seats at a screening
    Reserve {
        screening: i64,
        #[arg(required = true)]
        seats: Vec<usize>,
    },
    /// List your reservations
    Reservations,
    /// Change the seats of a reservation to exactly the given ones
    Edit {
        reservation: i64,
        #[arg(required = true)]
        seats: Vec<usize>,
    },
    /// Cancel a reservation
    Delete { reservation: i64 },
    /// Save a reservation's ticket as a text file
    Ticket {
        reservation: i64,
        /// Target directory, current directory by default
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

impl Command {
    /// The listing page this command was started from
    pub fn listing(&self) -> Route {
        match self {
            Command::Movies => Route::Movies,
            Command::Screenings | Command::Seats { .. } | Command::Reserve { .. } => {
                Route::Screenings
            }
            Command::Reservations
            | Command::Edit { .. }
            | Command::Delete { .. }
            | Command::Ticket { .. } => Route::Reservations,
            Command::Login { .. } | Command::Logout | Command::Whoami => Route::Login,
            Command::Register { .. } => Route::Register,
        }
    }
}

/// What to tell the user to run instead
pub fn route_hint(route: Route) -> &'static str {
    match route {
        Route::Home | Route::Movies => "cinema movies",
        Route::Screenings => "cinema screenings",
        Route::Reservations => "cinema reservations",
        Route::Login => "cinema login <username>",
        Route::Register => "cinema register <username>",
    }
}

/// Advice printed under a failed command
pub fn failure_hint(error: &Error, listing: Route) -> Option<String> {
    if let Some(route) = Route::redirect_for(error, listing) {
        return Some(format!("run `{}`", route_hint(route)));
    }
    if error.preserves_selection() {
        return Some("the seats were not changed; run the same command again to retry".into());
    }
    None
}

pub async fn run(state: &AppState, command: Command, scope: FlowScope) -> Result<()> {
    match command {
        Command::Movies => {
            let view = MoviesView::new(state.backend.clone());
            let movies = scope.guard(view.load()).await?;
            for movie in movies {
                println!("#{} {}", movie.id, movie.title);
                if !movie.director.is_empty() {
                    println!("    Director: {}", movie.director);
                }
                if !movie.actors.is_empty() {
                    println!("    Cast: {}", movie.actors);
                }
                if !movie.description.is_empty() {
                    println!("    {}", movie.description);
                }
            }
        }
        Command::Screenings => {
            let view = ScreeningsView::new(state.backend.clone());
            let screenings = scope.guard(view.load()).await?;
            for s in screenings {
                println!(
                    "#{} {} | {} - {} | {}/{} seats free",
                    s.screening_id,
                    s.movie_title,
                    s.start_time.format(DATE_TIME_FORMAT),
                    s.end_time.format("%H:%M"),
                    s.free_seats,
                    s.total_seats
                );
            }
        }
        Command::Seats { screening } => {
            let flow = ReservationFlow::open(
                scope,
                state.backend.clone(),
                state.session_provider(),
                ScreeningId(screening),
            )
            .await?;
            print_seat_map(&flow.seat_map());
        }
        Command::Login { username, password } => {
            let password = password_or_prompt(password, "Password: ")?;
            let view = AuthView::new(state.session.clone());
            scope
                .guard(view.login(&Credentials::new(username, password)))
                .await?;
            println!("{}", LOGIN_SUCCESS);
        }
        Command::Register { username, password } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let first = rpassword::prompt_password("Password: ")?;
                    let second = rpassword::prompt_password("Password (again): ")?;
                    if first != second {
                        return Err(Error::InvalidInput("Passwords do not match".into()));
                    }
                    first
                }
            };
            let view = AuthView::new(state.session.clone());
            let next = scope
                .guard(view.register(&Credentials::new(username, password)))
                .await?;
            println!("{}", REGISTER_SUCCESS);
            println!("Next: {}", route_hint(next));
        }
        Command::Logout => {
            AuthView::new(state.session.clone()).logout()?;
            println!("Logged out.");
        }
        Command::Whoami => match state.session.current_identity() {
            Some(identity) => println!("{} ({})", identity.username, identity.account_type.as_str()),
            None => println!("Not logged in."),
        },
        Command::Reserve { screening, seats } => {
            let mut flow = ReservationFlow::open(
                scope,
                state.backend.clone(),
                state.session_provider(),
                ScreeningId(screening),
            )
            .await?;
            flow.select_numbers(&seats)?;
            match flow.submit().await? {
                Some(id) => println!("{} Reservation #{}.", RESERVATION_SUCCESS, id),
                None => println!("{} See `{}`.", RESERVATION_SUCCESS, route_hint(Route::Reservations)),
            }
            print_seat_map(&flow.seat_map());
        }
        Command::Reservations => {
            let view =
                ReservationsView::open(scope, state.backend.clone(), state.session.as_ref())
                    .await?;
            let items = view.items();
            if items.is_empty() {
                println!("No reservations.");
            }
            for item in items {
                let when = item
                    .start_time
                    .map(|t| t.format(DATE_TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "No data".to_string());
                println!(
                    "#{} {} | {} | seats {}",
                    item.reservation_id, item.movie_title, when, item.seats
                );
            }
        }
        Command::Edit { reservation, seats } => {
            let mut flow = ReservationEditFlow::open(
                scope,
                state.backend.clone(),
                state.session_provider(),
                ReservationId(reservation),
            )
            .await?;
            flow.set_seat_numbers(&seats)?;
            let next = flow.submit().await?;
            println!("{}", UPDATE_SUCCESS);
            println!("Next: {}", route_hint(next));
        }
        Command::Delete { reservation } => {
            let mut view =
                ReservationsView::open(scope, state.backend.clone(), state.session.as_ref())
                    .await?;
            view.delete(ReservationId(reservation)).await?;
            println!("Reservation #{} cancelled.", reservation);
        }
        Command::Ticket { reservation, out } => {
            let view =
                ReservationsView::open(scope, state.backend.clone(), state.session.as_ref())
                    .await?;
            let dir = match out {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let path = view.export_ticket(ReservationId(reservation), &dir)?;
            println!("Ticket saved to {}", path.display());
        }
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => Ok(rpassword::prompt_password(prompt)?),
    }
}

fn print_seat_map(seats: &[SeatView]) {
    for row in seats.chunks(SEATS_PER_ROW) {
        let line: Vec<String> = row.iter().map(render_seat).collect();
        println!("{}", line.join(" "));
    }
    println!("[n] free  [ x] taken  (n) yours  *n* selected");
}

fn render_seat(seat: &SeatView) -> String {
    match (seat.state, seat.selected) {
        (_, true) => format!("*{:>2}*", seat.number),
        (SeatState::Free, false) => format!("[{:>2}]", seat.number),
        (SeatState::Mine, false) => format!("({:>2})", seat.number),
        (SeatState::Taken, false) => "[ x]".to_string(),
    }
}
