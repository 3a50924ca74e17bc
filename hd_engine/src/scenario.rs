use crate::{Particle, Vec2, World};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use thiserror::Error;

/// How much the master prints while stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Every particle at the start of every step, then the final report.
    EveryStep,
    /// Only the final report.
    FinalOnly,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("io error {0}")]
    Io(#[from] std::io::Error),
    #[error("incomplete header, expected `N L r S command`")]
    IncompleteHeader,
    #[error("malformed header value {0:?}")]
    BadHeaderValue(String),
    #[error("scene file error {0}")]
    Scene(#[from] serde_yaml::Error),
}

/// Everything the master needs to start a run: the world, the output
/// mode, and the explicitly supplied particles. Fewer particles than
/// the world's count is fine; the rest get synthesized.
#[derive(Debug, Clone)]
pub struct SimulationInput {
    pub world: World,
    pub mode: OutputMode,
    pub particles: Vec<Particle>,
}

impl SimulationInput {
    /// Parses the whitespace-token text form: a header `N L r S command`
    /// followed by up to N records `index x y vx vy`. The command word
    /// `print` selects per-step output; anything else means final-only.
    /// Record reading stops quietly at EOF or at the first malformed
    /// record; whatever is missing gets synthesized by the caller.
    pub fn from_text(mut reader: impl BufRead) -> Result<Self, InputError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut tokens = text.split_whitespace();

        let particle_count = parse_header_token::<usize>(tokens.next())?;
        let box_size = parse_header_token::<i64>(tokens.next())? as f64;
        let radius = parse_header_token::<i64>(tokens.next())? as f64;
        let steps = parse_header_token::<usize>(tokens.next())?;
        let command = tokens.next().ok_or(InputError::IncompleteHeader)?;
        let mode = if command == "print" {
            OutputMode::EveryStep
        } else {
            OutputMode::FinalOnly
        };
        let world = World::new(particle_count, box_size, radius, steps);

        let mut particles = Vec::new();
        'records: while particles.len() < particle_count {
            let index = match tokens.next().map(str::parse::<usize>) {
                Some(Ok(index)) => index,
                _ => break,
            };
            let mut values = [0.0f64; 4];
            for value in values.iter_mut() {
                match tokens.next().map(str::parse::<f64>) {
                    Some(Ok(parsed)) => *value = parsed,
                    _ => break 'records,
                }
            }
            particles.push(Particle::new(
                index,
                Vec2::new(values[0], values[1]),
                Vec2::new(values[2], values[3]),
            ));
        }

        Ok(SimulationInput {
            world,
            mode,
            particles,
        })
    }
}

fn parse_header_token<T: std::str::FromStr>(token: Option<&str>) -> Result<T, InputError> {
    let token = token.ok_or(InputError::IncompleteHeader)?;
    token
        .parse()
        .map_err(|_| InputError::BadHeaderValue(token.to_string()))
}

/// Explicit particle row of a scene file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ParticleSpec {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

/// A scene description: the YAML alternative to the stdin text protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub world: World,
    pub output: OutputMode,
    #[serde(default)]
    pub particles: Vec<ParticleSpec>,
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&text)?)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn into_input(self) -> SimulationInput {
        let particles = self
            .particles
            .iter()
            .map(|spec| {
                Particle::new(
                    spec.index,
                    Vec2::new(spec.x, spec.y),
                    Vec2::new(spec.vx, spec.vy),
                )
            })
            .collect();
        SimulationInput {
            world: self.world,
            mode: self.output,
            particles,
        }
    }
}
