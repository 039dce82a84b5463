use chrono::{
    DateTime,
    Duration,
    Utc,
};
use rand::{
    Rng,
    SeedableRng,
    distr::Alphanumeric,
    rngs::StdRng,
};

/// Entries the feed keeps once a highlight settles.
const FEED_CAP: usize = 10;
/// How long a freshly announced winner stays in the highlight slot.
const HIGHLIGHT_SECS: i64 = 2;
/// Chance of a new winner per feed tick.
const WIN_PROBABILITY: f64 = 0.1;

/// A past prize draw as shown in the feed. Synthesized locally; the feed is
/// a demonstration, not a ledger view.
#[derive(Clone, Debug, PartialEq)]
pub struct Winner {
    pub id: u64,
    pub address: String,
    pub prize_mas: f64,
    pub timestamp: DateTime<Utc>,
    pub tx_hash: String,
}

/// Rolling list of recent winners plus at most one incoming entry being
/// highlighted before it joins the list.
pub struct WinnersFeed {
    winners: Vec<Winner>,
    incoming: Option<(Winner, DateTime<Utc>)>,
    next_id: u64,
    rng: StdRng,
}

const SEED_WINNERS: [(&str, f64, i64); 5] = [
    ("AU12nYtZ8qLm4vKc3W", 142.5, 2),
    ("AU12hPw7dXrB9sQf1J", 88.2, 17),
    ("AU12tKm3cVnD5xRg8L", 210.0, 64),
    ("AU12bQz6fJpH2wNy4T", 67.8, 190),
    ("AU12sDv9gMkC7uEa5P", 175.3, 1480),
];

impl WinnersFeed {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_rng(now, StdRng::from_os_rng())
    }

    pub fn with_rng(now: DateTime<Utc>, rng: StdRng) -> Self {
        let winners = SEED_WINNERS
            .iter()
            .enumerate()
            .map(|(i, (address, prize, minutes_ago))| Winner {
                id: i as u64,
                address: (*address).to_string(),
                prize_mas: *prize,
                timestamp: now - Duration::minutes(*minutes_ago),
                tx_hash: format!("O1seed{i}"),
            })
            .collect::<Vec<_>>();
        let next_id = winners.len() as u64;
        Self {
            winners,
            incoming: None,
            next_id,
            rng,
        }
    }

    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    /// The winner currently being highlighted, if any.
    pub fn incoming(&self) -> Option<&Winner> {
        self.incoming.as_ref().map(|(winner, _)| winner)
    }

    /// One feed period has elapsed. Settles any due highlight, then rolls
    /// for a new winner.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.settle(now);
        if self.incoming.is_none() && self.rng.random_bool(WIN_PROBABILITY) {
            let winner = self.synthesize(now);
            self.incoming = Some((winner, now));
        }
    }

    /// Moves the highlighted entry into the list once its highlight window
    /// has passed.
    pub fn settle(&mut self, now: DateTime<Utc>) {
        let due = self
            .incoming
            .as_ref()
            .is_some_and(|(_, announced)| (now - *announced).num_seconds() >= HIGHLIGHT_SECS);
        if !due {
            return;
        }
        if let Some((winner, _)) = self.incoming.take() {
            self.winners.insert(0, winner);
            self.winners.truncate(FEED_CAP);
        }
    }

    fn synthesize(&mut self, now: DateTime<Utc>) -> Winner {
        let suffix: String = (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(14)
            .map(char::from)
            .collect();
        let hash_bytes: [u8; 16] = self.rng.random();
        let prize_mas = (self.rng.random_range(50.0_f64..250.0) * 10.0).round() / 10.0;
        let id = self.next_id;
        self.next_id += 1;
        Winner {
            id,
            address: format!("AU12{suffix}"),
            prize_mas,
            timestamp: now,
            tx_hash: format!("O1{}", hex::encode(hash_bytes)),
        }
    }
}
