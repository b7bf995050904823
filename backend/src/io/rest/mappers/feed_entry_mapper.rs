use crate::domain::commands::feed_entries::{CreateFeedEntryCommand, UpdateFeedEntryCommand};
use crate::domain::models::{
    FeedEntry as DomainFeedEntry, FeedType as DomainFeedType, StartingBreast as DomainBreast,
};
use crate::domain::validation::{format_date, format_time};
use shared::{
    CreateFeedEntryRequest, FeedEntry as SharedFeedEntry, FeedType as SharedFeedType,
    StartingBreast as SharedBreast, UpdateFeedEntryRequest,
};

use super::{format_optional_timestamp, format_timestamp};

/// Mapper to convert between shared FeedEntry DTOs and domain FeedEntry models.
pub struct FeedEntryMapper;

impl FeedEntryMapper {
    pub fn to_dto(domain: DomainFeedEntry) -> SharedFeedEntry {
        SharedFeedEntry {
            date: format_date(&domain.date),
            time: format_time(&domain.time),
            feed_type: Self::feed_type_to_dto(domain.feed_type),
            starting_breast: domain.starting_breast.map(Self::breast_to_dto),
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_optional_timestamp(&domain.updated_at),
            id: domain.id,
            baby_id: domain.baby_id,
            user_id: domain.user_id,
            temperature: domain.temperature,
            did_pee: domain.did_pee,
            did_poo: domain.did_poo,
            did_throw_up: domain.did_throw_up,
            comment: domain.comment,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainFeedEntry>) -> Vec<SharedFeedEntry> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: CreateFeedEntryRequest) -> CreateFeedEntryCommand {
        CreateFeedEntryCommand {
            baby_id: request.baby_id,
            date: request.date,
            time: request.time,
            feed_type: Self::feed_type_to_domain(request.feed_type),
            starting_breast: request.starting_breast.map(Self::breast_to_domain),
            temperature: request.temperature,
            did_pee: request.did_pee,
            did_poo: request.did_poo,
            did_throw_up: request.did_throw_up,
            comment: request.comment,
        }
    }

    pub fn to_update_command(request: UpdateFeedEntryRequest) -> UpdateFeedEntryCommand {
        UpdateFeedEntryCommand {
            baby_id: request.baby_id,
            date: request.date,
            time: request.time,
            feed_type: request.feed_type.map(Self::feed_type_to_domain),
            starting_breast: request.starting_breast.map(Self::breast_to_domain),
            temperature: request.temperature,
            did_pee: request.did_pee,
            did_poo: request.did_poo,
            did_throw_up: request.did_throw_up,
            comment: request.comment,
        }
    }

    fn feed_type_to_dto(feed_type: DomainFeedType) -> SharedFeedType {
        match feed_type {
            DomainFeedType::Bottle => SharedFeedType::Bottle,
            DomainFeedType::Breast => SharedFeedType::Breast,
        }
    }

    fn feed_type_to_domain(feed_type: SharedFeedType) -> DomainFeedType {
        match feed_type {
            SharedFeedType::Bottle => DomainFeedType::Bottle,
            SharedFeedType::Breast => DomainFeedType::Breast,
        }
    }

    fn breast_to_dto(breast: DomainBreast) -> SharedBreast {
        match breast {
            DomainBreast::Left => SharedBreast::Left,
            DomainBreast::Right => SharedBreast::Right,
        }
    }

    fn breast_to_domain(breast: SharedBreast) -> DomainBreast {
        match breast {
            SharedBreast::Left => DomainBreast::Left,
            SharedBreast::Right => DomainBreast::Right,
        }
    }
}
