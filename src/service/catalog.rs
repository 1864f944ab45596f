pub const PACKAGE_PREFIX: &str = "buy_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarsPackage {
    pub amount: u32,
    pub price: u32,
    pub points: u32,
    /// Percent, display only.
    pub discount: u8,
}

impl StarsPackage {
    const fn new(amount: u32, price: u32, points: u32, discount: u8) -> Self {
        Self {
            amount,
            price,
            points,
            discount,
        }
    }

    pub fn key(&self) -> String {
        format!("{}{}", PACKAGE_PREFIX, self.amount)
    }
}

const DEFAULT_PACKAGES: [StarsPackage; 7] = [
    StarsPackage::new(50, 80, 1, 0),
    StarsPackage::new(75, 130, 2, 5),
    StarsPackage::new(100, 160, 2, 10),
    StarsPackage::new(250, 380, 4, 15),
    StarsPackage::new(500, 780, 8, 20),
    StarsPackage::new(750, 1300, 12, 25),
    StarsPackage::new(1000, 1580, 15, 30),
];

/// Fixed package list, built once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    packages: Vec<StarsPackage>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            packages: DEFAULT_PACKAGES.to_vec(),
        }
    }
}

impl Catalog {
    pub fn packages(&self) -> &[StarsPackage] {
        &self.packages
    }

    pub fn get(&self, key: &str) -> Option<StarsPackage> {
        self.packages.iter().find(|package| package.key() == key).copied()
    }
}
