pub mod predictor;
pub mod yahoo;

pub use predictor::{
    Evaluator, MarketContext, MultiPrediction, PredictRequest, Prediction, Predictor,
    PredictorConfig, SinglePrediction,
};
pub use yahoo::YahooClient;
