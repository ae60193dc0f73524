//! A proof-of-concept for the light client use case, mocking the client/server parts.

use txtree::{BuildConfig, HashProof, Output, Sha256, Sha256Tree};

type Record = String;

pub struct Server {
    records: Vec<Record>,
    proofs: Vec<HashProof<Sha256>>,
    tree: Sha256Tree,
}

impl Server {
    pub async fn upload_records(records: Vec<Record>, config: &BuildConfig) -> Result<Self, txtree::Error> {
        let tree = Sha256Tree::build(&records, config)?;
        let proofs = records.iter().flat_map(|record| tree.proof(record)).collect();

        println!("{} records successfully uploaded (root hash: {})", records.len(), tree.root_hex());

        Ok(Self { records, proofs, tree })
    }

    pub async fn root_hash(&self) -> Output<Sha256> {
        *self.tree.hash()
    }

    pub async fn download_record(&self, index: usize) -> Result<(Record, HashProof<Sha256>), &'static str> {
        match (self.records.get(index), self.proofs.get(index)) {
            (Some(record), Some(proof)) => Ok((record.clone(), proof.clone())),
            _ => Err("Record not found..."),
        }
    }

    pub fn alter_record(&mut self, index: usize) {
        if let Some(record) = self.records.get_mut(index) {
            *record = record
                .chars()
                .map(|c| match c {
                    _ if c.is_ascii_lowercase() => c.to_ascii_uppercase(),
                    _ if c.is_ascii_uppercase() => c.to_ascii_lowercase(),
                    _ => c,
                })
                .collect();

            println!("Oh noes, record #{index} got corrupted on server side!!!");
        }
    }
}

/// A client only keeping track of the root hash.
#[derive(Default)]
pub struct Client {
    root_hash: Output<Sha256>,
}

impl Client {
    pub async fn store_root_hash(&mut self, root_hash: Output<Sha256>) {
        self.root_hash = root_hash;
    }

    pub async fn restore_record(&self, server: &Server, index: usize) -> Result<Record, &'static str> {
        let (record, proof) = server.download_record(index).await?;

        self.check_record(&record, &proof)?;

        Ok(record)
    }

    fn check_record(&self, record: &Record, proof: &HashProof<Sha256>) -> Result<(), &'static str> {
        match txtree::verify(record, proof, &self.root_hash) {
            true => Ok(()),
            false => Err("Record is corrupted!"),
        }
    }
}

/// Upload the records, corrupt one of them on server side, then restore them all (and one more) on client side.
pub async fn run(
    records: Vec<Record>,
    config: &BuildConfig,
    corrupted: usize,
) -> Result<Vec<Result<Record, &'static str>>, txtree::Error> {
    let count = records.len();

    println!("Uploading records...");
    let mut server = Server::upload_records(records, config).await?;

    let mut client = Client::default();
    let root_hash = server.root_hash().await;
    println!("Storing local information... (root hash: {})", hex::encode(root_hash));
    client.store_root_hash(root_hash).await;

    server.alter_record(corrupted);

    let mut restored = Vec::with_capacity(count + 1);
    for index in 0..count + 1 {
        print!("Restoring record #{index}...");
        let res = client.restore_record(&server, index).await;
        println!(" {res:?}");
        restored.push(res);
    }

    Ok(restored)
}
