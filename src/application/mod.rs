//! Application layer
//! 파서, 실행 엔진, 훅 컨텍스트, 대화형 다리를 정의하고 포트를 통해 인프라를 사용한다.

pub mod bridge;
pub mod config;
pub mod context;
pub mod parser;
pub mod ports;
pub mod usecases;
