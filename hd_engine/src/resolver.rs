use log::debug;
use ordered_float::OrderedFloat;

use crate::collective::Collective;
use crate::collision_utils;
use crate::event::StepEvent;
use crate::partition::Partition;
use crate::{Particle, Vec2, World};

/// Doubles per particle in the state payloads:
/// index-as-double, x, y, vx, vy.
const STATE_STRIDE: usize = 5;

/// One cooperating worker of the group. Each worker holds a private copy
/// of the full particle array; inside a step only the owned slice is
/// authoritative, and the closing state exchange restores group
/// consensus on every row below the particle count.
///
/// All scratch is allocated at construction and reused every step.
pub struct Worker {
    world: World,
    partition: Partition,
    link: Collective,
    particles: Vec<Particle>,
    /// Wall contact time per owned slot, refreshed at the top of a step.
    wall_times: Vec<f64>,
    /// Pair contact times, row-major: owned slot i, partner j < n.
    pair_times: Vec<f64>,
    /// Preferred partner per particle, -1 for wall/free/undecided.
    partners: Vec<i32>,
    /// 1 once a particle's event is settled; padding slots start at 1.
    resolved: Vec<i32>,
    /// Settled event per owned slot.
    chosen: Vec<StepEvent>,
    send_ints: Vec<i32>,
    send_reals: Vec<f64>,
    recv_reals: Vec<f64>,
}

impl Worker {
    pub fn new(world: World, partition: Partition, link: Collective) -> Self {
        assert_eq!(partition.particle_count(), world.particle_count);
        assert_eq!(partition.workers(), link.size());
        let block = partition.block_size();
        let padded = partition.padded_len();
        Worker {
            world,
            partition,
            link,
            particles: vec![Particle::default(); padded],
            wall_times: vec![0.0; block],
            pair_times: vec![0.0; block * world.particle_count],
            partners: vec![-1; padded],
            resolved: vec![0; padded],
            chosen: vec![StepEvent::Free { particle: 0 }; block],
            send_ints: vec![0; 2 * block],
            send_reals: vec![0.0; STATE_STRIDE * block],
            recv_reals: vec![0.0; STATE_STRIDE * padded],
        }
    }

    pub fn rank(&self) -> usize {
        self.link.rank()
    }

    /// The real particles (padding rows excluded).
    pub fn particles(&self) -> &[Particle] {
        &self.particles[..self.world.particle_count]
    }

    /// Installs an initial particle set. Meaningful on the master only;
    /// everyone else receives the state through `distribute_initial`.
    pub fn load_particles(&mut self, particles: &[Particle]) {
        assert!(particles.len() <= self.particles.len());
        self.particles[..particles.len()].copy_from_slice(particles);
    }

    /// The step-0 broadcast: the master's full array (padding included)
    /// is published to every worker. Must be called by all workers
    /// before the first step.
    pub fn distribute_initial(&mut self) {
        if self.rank() == 0 {
            for (i, particle) in self.particles.iter().enumerate() {
                pack_state(&mut self.recv_reals[i * STATE_STRIDE..], particle);
            }
        }
        self.link.broadcast_reals(0, &mut self.recv_reals);
        if self.rank() != 0 {
            for i in 0..self.particles.len() {
                unpack_state(&self.recv_reals[i * STATE_STRIDE..], &mut self.particles[i]);
            }
        }
    }

    /// Advances the shared state by one unit step: collision-time
    /// tables, the mutual-consent selection loop, event application for
    /// the owned slice, then the closing state exchange.
    pub fn step(&mut self) {
        self.compute_time_tables();
        self.select_events();
        let owned = self.partition.owned_range(self.rank());
        for slot in 0..owned.len() {
            let event = self.chosen[slot];
            event.apply(&mut self.particles, &self.world, &owned);
        }
        self.exchange_state();
    }

    /// Gathers the authoritative collision counters (each worker's owned
    /// rows) from the whole group. This is a collective: every worker
    /// must call it at the same point of the run, typically once after
    /// the last step; the master turns the result into the final report.
    pub fn collision_totals(&mut self) -> Vec<(u32, u32)> {
        let block = self.partition.block_size();
        let owned = self.partition.owned_range(self.rank());
        self.send_ints[..2 * block].fill(0);
        for (slot, i) in owned.enumerate() {
            self.send_ints[2 * slot] = self.particles[i].pair_collisions as i32;
            self.send_ints[2 * slot + 1] = self.particles[i].wall_collisions as i32;
        }
        let mut gathered = vec![0i32; 2 * self.partition.padded_len()];
        self.link.all_gather_ints(&self.send_ints[..2 * block], &mut gathered);
        (0..self.world.particle_count)
            .map(|i| (gathered[2 * i] as u32, gathered[2 * i + 1] as u32))
            .collect()
    }

    /// Wall and pair contact times for the owned slice, pure functions
    /// of the start-of-step state.
    fn compute_time_tables(&mut self) {
        let n = self.world.particle_count;
        for (slot, i) in self.partition.owned_range(self.rank()).enumerate() {
            let particle = self.particles[i];
            self.wall_times[slot] = collision_utils::find_particle_vs_wall_collision(
                particle.position,
                particle.velocity,
                self.world.radius,
                self.world.box_size,
            );
            let row = &mut self.pair_times[slot * n..(slot + 1) * n];
            for (j, time) in row.iter_mut().enumerate() {
                let other = self.particles[j];
                *time = collision_utils::find_particle_vs_particle_collision(
                    particle.position,
                    particle.velocity,
                    other.position,
                    other.velocity,
                    self.world.radius,
                );
            }
        }
    }

    /// The mutual-consent loop. Each round every owned, unsettled
    /// particle re-picks its earliest candidate among the unsettled;
    /// partner choices are gathered group-wide, and a candidate survives
    /// when it is self-contained (wall or free) or chosen back. The
    /// round count is identical on every worker because the termination
    /// test runs on the gathered `resolved` array.
    fn select_events(&mut self) {
        let n = self.world.particle_count;
        let block = self.partition.block_size();
        let owned = self.partition.owned_range(self.rank());
        let slots = self.partition.block_range(self.rank());

        // Padding slots are born settled and partnerless so they never
        // join the negotiation.
        for i in 0..self.partition.padded_len() {
            self.resolved[i] = if i < n { 0 } else { 1 };
            self.partners[i] = -1;
        }

        let mut settled = 0;
        let mut rounds = 0;
        while settled != n {
            rounds += 1;
            for (slot, i) in owned.clone().enumerate() {
                if self.resolved[i] != 0 {
                    continue;
                }
                self.partners[i] = -1;
                let mut best = StepEvent::Free { particle: i };
                // The wall candidate goes first: on equal times it wins.
                if self.wall_times[slot] < 1.0 {
                    best = StepEvent::Wall {
                        particle: i,
                        time: OrderedFloat(self.wall_times[slot]),
                    };
                }
                let row = &self.pair_times[slot * n..(slot + 1) * n];
                for (j, &time) in row.iter().enumerate() {
                    if j == i || self.resolved[j] != 0 {
                        continue;
                    }
                    // Strict comparison: ties keep the earlier-scanned
                    // candidate.
                    if time > -1.0 && OrderedFloat(time) < best.time() && time < 1.0 {
                        best = StepEvent::Pair {
                            first: i,
                            second: j,
                            time: OrderedFloat(time),
                        };
                        self.partners[i] = j as i32;
                    }
                }
                self.chosen[slot] = best;
            }

            // Everyone learns everyone's preferred partner.
            self.send_ints[..block].copy_from_slice(&self.partners[slots.clone()]);
            self.link
                .all_gather_ints(&self.send_ints[..block], &mut self.partners);

            for i in owned.clone() {
                if self.resolved[i] != 0 {
                    continue;
                }
                let partner = self.partners[i];
                if partner < 0 || self.partners[partner as usize] == i as i32 {
                    self.resolved[i] = 1;
                }
            }

            self.send_ints[..block].copy_from_slice(&self.resolved[slots.clone()]);
            self.link
                .all_gather_ints(&self.send_ints[..block], &mut self.resolved);
            settled = self.resolved[..n].iter().filter(|&&flag| flag != 0).count();
        }
        debug!("worker {}: selection settled in {} round(s)", self.rank(), rounds);
    }

    /// The closing all-gather: every worker contributes its owned block
    /// and every replica overwrites rows below the particle count with
    /// the gathered consensus. Padding slots travel but are discarded.
    fn exchange_state(&mut self) {
        for (slot, i) in self.partition.block_range(self.rank()).enumerate() {
            pack_state(&mut self.send_reals[slot * STATE_STRIDE..], &self.particles[i]);
        }
        self.link.all_gather_reals(&self.send_reals, &mut self.recv_reals);
        for i in 0..self.world.particle_count {
            unpack_state(&self.recv_reals[i * STATE_STRIDE..], &mut self.particles[i]);
        }
    }
}

fn pack_state(buffer: &mut [f64], particle: &Particle) {
    buffer[0] = particle.index as f64;
    buffer[1] = particle.position.x;
    buffer[2] = particle.position.y;
    buffer[3] = particle.velocity.x;
    buffer[4] = particle.velocity.y;
}

fn unpack_state(buffer: &[f64], particle: &mut Particle) {
    particle.index = buffer[0] as usize;
    particle.position = Vec2::new(buffer[1], buffer[2]);
    particle.velocity = Vec2::new(buffer[3], buffer[4]);
}
