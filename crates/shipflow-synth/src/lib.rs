//! ShipFlow パイプライン合成
//!
//! 読み込み済みのパイプライン設定から、ステージ解決・デプロイアクション生成・
//! プラン書き出しまでを担います。合成は単一スレッドで1回の実行につき
//! 1回だけ行われます。

pub mod action;
pub mod assembler;
pub mod commands;
pub mod error;
pub mod render;
pub mod resolver;
pub mod synth;

pub use action::{Artifact, DeployAction};
pub use assembler::{PipelinePlan, assemble};
pub use error::{Result, SynthError};
pub use render::DocumentRenderer;
pub use resolver::{ResolvedStage, StageResolver};
pub use synth::{SynthOutput, synthesize};
