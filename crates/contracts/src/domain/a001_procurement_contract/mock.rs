use crate::shared::record::{Record, RecordKey};

use super::aggregate::ProcurementContract;

fn contract(
    key: i64,
    contract_no: &str,
    supplier: &str,
    quantities: (i64, i64, i64),
    sign_date: &str,
    materials: &[&str],
    quality_requirement: Option<&str>,
) -> ProcurementContract {
    let (purchase_quantity, arrival_quantity, warehouse_quantity) = quantities;
    ProcurementContract {
        key: Some(RecordKey::Number(key)),
        contract_no: contract_no.to_string(),
        supplier: supplier.to_string(),
        purchase_quantity,
        arrival_quantity,
        warehouse_quantity,
        sign_date: sign_date.to_string(),
        materials: materials.iter().map(|m| m.to_string()).collect(),
        quality_requirement: quality_requirement.map(str::to_string),
        delivery_mode: "送货".to_string(),
        delivery_address: Some("一号仓库".to_string()),
        contact_phone: Some("13800138000".to_string()),
        contact_email: None,
    }
}

/// Seed contracts for the list page
pub fn mock_contracts() -> Vec<ProcurementContract> {
    vec![
        contract(
            1,
            "HT-2024-001",
            "北京钢铁集团",
            (1000, 1000, 1000),
            "2024-01-15",
            &["螺纹钢", "线材"],
            Some("GB/T 1499.2"),
        ),
        contract(
            2,
            "HT-2024-002",
            "上海精密轴承",
            (500, 200, 150),
            "2024-02-03",
            &["轴承"],
            None,
        ),
        contract(
            3,
            "HT-2024-003",
            "北京华润化工",
            (300, 0, 0),
            "2024-02-20",
            &["工业酒精"],
            Some("纯度≥99.5%"),
        ),
        contract(
            4,
            "HT-2024-004",
            "广州电子元件",
            (2000, 2000, 2000),
            "2024-03-08",
            &["电容", "电阻"],
            None,
        ),
        contract(
            5,
            "HT-2024-005",
            "天津包装材料",
            (800, 800, 600),
            "2024-03-22",
            &["纸箱"],
            Some("防潮"),
        ),
    ]
}

pub fn mock_records() -> Vec<Record> {
    mock_contracts()
        .iter()
        .filter_map(|c| c.to_record().ok())
        .collect()
}
