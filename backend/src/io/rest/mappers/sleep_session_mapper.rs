use crate::domain::commands::sleep_sessions::{
    CreateSleepSessionCommand, StopSleepCommand, UpdateSleepSessionCommand,
};
use crate::domain::models::SleepSession as DomainSleepSession;
use crate::domain::validation::{format_date, format_time};
use shared::{
    CreateSleepSessionRequest, SleepSession as SharedSleepSession, StopSleepRequest,
    UpdateSleepSessionRequest,
};

use super::{format_optional_timestamp, format_timestamp};

pub struct SleepSessionMapper;

impl SleepSessionMapper {
    pub fn to_dto(domain: DomainSleepSession) -> SharedSleepSession {
        SharedSleepSession {
            date: format_date(&domain.date),
            start_time: format_time(&domain.start_time),
            end_time: domain.end_time.as_ref().map(format_time),
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_optional_timestamp(&domain.updated_at),
            id: domain.id,
            baby_id: domain.baby_id,
            user_id: domain.user_id,
            duration_minutes: domain.duration_minutes,
            is_active: domain.is_active,
            comment: domain.comment,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainSleepSession>) -> Vec<SharedSleepSession> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: CreateSleepSessionRequest) -> CreateSleepSessionCommand {
        CreateSleepSessionCommand {
            baby_id: request.baby_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            duration_minutes: request.duration_minutes,
            is_active: request.is_active,
            comment: request.comment,
        }
    }

    pub fn to_update_command(request: UpdateSleepSessionRequest) -> UpdateSleepSessionCommand {
        UpdateSleepSessionCommand {
            baby_id: request.baby_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            duration_minutes: request.duration_minutes,
            is_active: request.is_active,
            comment: request.comment,
        }
    }

    pub fn to_stop_command(request: StopSleepRequest) -> StopSleepCommand {
        StopSleepCommand {
            end_time: request.end_time,
            duration_minutes: request.duration_minutes,
        }
    }
}
