//! # Report Core
//!
//! 일별 거래 리포트 ETL의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 ETL 전반에서 사용되는 기본 타입을 제공합니다:
//! - 원시 체결 레코드 및 일별 리포트 레코드
//! - 워터마크(처리 이력) 레코드
//! - 테이블 포맷 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
