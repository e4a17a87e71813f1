pub mod chat_dto;
pub mod document_dto;
pub mod job_dto;
pub mod response_dto;

pub use chat_dto::{ChatRequestDto, ChatResponseDto, HistoryEntryDto};
pub use document_dto::{DocumentDto, UploadAcceptedDto};
pub use job_dto::JobDto;
pub use response_dto::ApiResponse;
