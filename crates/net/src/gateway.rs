//! Repository implementations over the REST API

use async_trait::async_trait;
use cinema_core::{
    AccountGateway, Credentials, Error as CoreError, Identity, Movie, MovieRepository,
    NewReservation, Reservation, ReservationId, ReservationRepository, ReservationUpdate,
    Result as CoreResult, Screening, ScreeningId, ScreeningRepository,
};
use reqwest::Method;
use tracing::{info, instrument, warn};

use crate::client::{paths, ApiClient};
use crate::wire::{
    self, AccountResponseDto, CreatedReservationDto, LoginRequestDto, MovieDto,
    RegisterRequestDto, ReservationDto, ReservationWriteDto, ScreeningDto,
};

#[async_trait]
impl MovieRepository for ApiClient {
    #[instrument(skip(self))]
    async fn list_movies(&self) -> CoreResult<Vec<Movie>> {
        let movies: Vec<MovieDto> = self.get_json(paths::MOVIES).await?;
        Ok(movies.into_iter().map(MovieDto::into_model).collect())
    }
}

#[async_trait]
impl ScreeningRepository for ApiClient {
    #[instrument(skip(self))]
    async fn list_screenings(&self) -> CoreResult<Vec<Screening>> {
        let body = self.get_bytes(paths::SCREENINGS).await?;
        Ok(wire::decode_screenings(&body)?)
    }

    #[instrument(skip(self), fields(screening_id = %id))]
    async fn get_screening(&self, id: ScreeningId) -> CoreResult<Option<Screening>> {
        let Some(body) = self.get_optional(&paths::screening(id.0)).await? else {
            return Ok(None);
        };
        let dto: ScreeningDto = wire::decode(&body)?;
        Ok(Some(dto.into_model()?))
    }
}

#[async_trait]
impl ReservationRepository for ApiClient {
    #[instrument(skip(self))]
    async fn list_reservations(&self) -> CoreResult<Vec<Reservation>> {
        let reservations: Vec<ReservationDto> = self.get_json(paths::RESERVATIONS).await?;
        Ok(reservations
            .into_iter()
            .map(ReservationDto::into_model)
            .collect())
    }

    #[instrument(skip(self, reservation), fields(screening_id = %reservation.screening_id, seat_count = reservation.seats.len()))]
    async fn create_reservation(
        &self,
        reservation: &NewReservation,
    ) -> CoreResult<Option<ReservationId>> {
        let body = self
            .send_json(
                Method::POST,
                paths::CREATE_RESERVATION,
                &ReservationWriteDto::for_create(reservation),
            )
            .await
            .map_err(|e| e.into_mutation_error())?;

        // The write is done once the status is 2xx; an odd body only loses the id
        let created = match wire::decode::<CreatedReservationDto>(&body) {
            Ok(created) => Some(ReservationId(created.reservation_id)),
            Err(e) => {
                warn!(error = %e, "Reservation created without a readable id");
                None
            }
        };
        info!(reservation_id = ?created, "Reservation created");
        Ok(created)
    }

    #[instrument(skip(self, update), fields(reservation_id = %update.reservation_id, seat_count = update.seats.len()))]
    async fn update_reservation(&self, update: &ReservationUpdate) -> CoreResult<()> {
        self.send_json(
            Method::PUT,
            &paths::update_reservation(update.reservation_id.0),
            &ReservationWriteDto::for_update(update),
        )
        .await
        .map_err(|e| e.into_mutation_error())?;

        info!("Reservation updated");
        Ok(())
    }

    #[instrument(skip(self), fields(reservation_id = %id))]
    async fn delete_reservation(&self, id: ReservationId) -> CoreResult<()> {
        self.delete(&paths::delete_reservation(id.0))
            .await
            .map_err(|e| e.into_mutation_error())?;

        info!("Reservation deleted");
        Ok(())
    }
}

#[async_trait]
impl AccountGateway for ApiClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> CoreResult<Identity> {
        let request = LoginRequestDto {
            username: &credentials.username,
            password: &credentials.password,
        };
        let body = self
            .send_json(Method::POST, paths::LOGIN, &request)
            .await
            .map_err(|e| e.into_auth_error())?;

        let response: AccountResponseDto = wire::decode(&body)?;
        if !response.success {
            return Err(CoreError::Authentication(
                response.message.unwrap_or_else(|| "Login failed.".into()),
            ));
        }

        Ok(Identity::new(credentials.username.clone())
            .with_account_type(response.account_type()))
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn register(&self, credentials: &Credentials) -> CoreResult<()> {
        let request = RegisterRequestDto {
            username: &credentials.username,
            password: &credentials.password,
            account_type: "User",
        };
        let body = self
            .send_json(Method::POST, paths::REGISTER, &request)
            .await
            .map_err(|e| e.into_auth_error())?;

        let response: AccountResponseDto = wire::decode(&body)?;
        if !response.success {
            return Err(CoreError::Authentication(response.message.unwrap_or_else(
                || "Registration failed. User can already exist.".into(),
            )));
        }

        Ok(())
    }
}
