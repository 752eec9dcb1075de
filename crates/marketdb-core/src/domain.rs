//! 데이터 도메인 정의.
//!
//! 적재 파이프라인이 다루는 네 가지 데이터 범주(환율, 현물, 주식, 뉴스)를
//! 정의합니다. 도메인마다 고유한 대상 테이블과 변환 로직이 있습니다.

use serde::{Deserialize, Serialize};

/// 지원되는 데이터 도메인
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// 환율 (3필드: 날짜, 통화명, 환율)
    Currency,
    /// 현물/원자재 시세 (6필드)
    Material,
    /// 주식 시세 (스키마 버전에 따라 10 또는 11필드)
    Stock,
    /// 뉴스 기사 (4필드)
    News,
}

impl Domain {
    /// 모든 도메인, 고정된 처리 순서
    pub const ALL: [Domain; 4] = [
        Domain::Currency,
        Domain::Material,
        Domain::Stock,
        Domain::News,
    ];

    /// 문자열에서 도메인 파싱
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "currency" | "cur" => Some(Self::Currency),
            "material" | "domestic" => Some(Self::Material),
            "stock" => Some(Self::Stock),
            "news" => Some(Self::News),
            _ => None,
        }
    }

    /// 대상 테이블 이름 반환
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Material => "material_origin",
            Self::Stock => "stock_crawl",
            Self::News => "news_origin",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Material => "material",
            Self::Stock => "stock",
            Self::News => "news",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
