use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSet {
    Manajerial,
    Kewirausahaan,
    Supervisi,
}

impl DocumentSet {
    pub const fn ordered() -> [Self; 3] {
        [Self::Manajerial, Self::Kewirausahaan, Self::Supervisi]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Manajerial => "Beban Kerja Manajerial",
            Self::Kewirausahaan => "Pengembangan Kewirausahaan",
            Self::Supervisi => "Supervisi Guru dan Tenaga Kependidikan",
        }
    }

    pub fn documents(self) -> &'static [WorkloadDocument] {
        match self {
            Self::Manajerial => &MANAJERIAL_DOCUMENTS,
            Self::Kewirausahaan => &KEWIRAUSAHAAN_DOCUMENTS,
            Self::Supervisi => &SUPERVISI_DOCUMENTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkloadDocument {
    pub id: &'static str,
    pub label: &'static str,
    pub set: DocumentSet,
}

pub fn find_document(id: &str) -> Option<&'static WorkloadDocument> {
    DocumentSet::ordered()
        .into_iter()
        .flat_map(|set| set.documents().iter())
        .find(|document| document.id == id)
}

const fn manajerial(id: &'static str, label: &'static str) -> WorkloadDocument {
    WorkloadDocument {
        id,
        label,
        set: DocumentSet::Manajerial,
    }
}

const fn kewirausahaan(id: &'static str, label: &'static str) -> WorkloadDocument {
    WorkloadDocument {
        id,
        label,
        set: DocumentSet::Kewirausahaan,
    }
}

const fn supervisi(id: &'static str, label: &'static str) -> WorkloadDocument {
    WorkloadDocument {
        id,
        label,
        set: DocumentSet::Supervisi,
    }
}

pub static MANAJERIAL_DOCUMENTS: [WorkloadDocument; 10] = [
    manajerial("m1", "Rencana Kerja Jangka Menengah (RKJM)"),
    manajerial("m2", "Rencana Kerja Tahunan (RKT)"),
    manajerial("m3", "Rencana Kegiatan dan Anggaran Sekolah (RKAS)"),
    manajerial("m4", "Struktur Organisasi dan Pembagian Tugas"),
    manajerial("m5", "Kurikulum Operasional Satuan Pendidikan"),
    manajerial("m6", "Pengelolaan Sarana dan Prasarana"),
    manajerial("m7", "Pengelolaan Peserta Didik"),
    manajerial("m8", "Pengelolaan Keuangan Sekolah"),
    manajerial("m9", "Pengelolaan Hubungan Masyarakat"),
    manajerial("m10", "Laporan Evaluasi Diri Sekolah"),
];

pub static KEWIRAUSAHAAN_DOCUMENTS: [WorkloadDocument; 5] = [
    kewirausahaan("k1", "Rencana Program Kewirausahaan Sekolah"),
    kewirausahaan("k2", "Inovasi Pengembangan Sekolah"),
    kewirausahaan("k3", "Unit Produksi atau Jasa"),
    kewirausahaan("k4", "Kemitraan dengan Dunia Usaha"),
    kewirausahaan("k5", "Laporan Hasil Kewirausahaan"),
];

pub static SUPERVISI_DOCUMENTS: [WorkloadDocument; 3] = [
    supervisi("s1", "Program Supervisi Akademik"),
    supervisi("s2", "Pelaksanaan Supervisi Akademik"),
    supervisi("s3", "Tindak Lanjut Hasil Supervisi"),
];
